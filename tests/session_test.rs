//! Screen session integration tests
//!
//! Drive one session event by event against recording mocks.

mod common;

use common::{Harness, MockDetector};
use himba_voice::asr::{RecognitionErrorKind, RecognizerEvent};
use himba_voice::collab::ProfileStore;
use himba_voice::commands::{DetectionMode, DetectionRequest, NavOption, Screen};
use himba_voice::session::{ControlEvent, SessionOptions};
use himba_voice::tts::SynthesizerEvent;
use himba_voice::{SessionEvent, TurnState};

#[tokio::test]
async fn test_opens_listening_with_hints() {
    let h = Harness::open(Screen::Home);
    assert_eq!(h.state(), TurnState::Listening);
    h.assert_consistent();
    let hints = h.asr.log.lock().unwrap().hints.clone();
    assert!(hints.contains(&"move to navigation".to_string()));
}

#[tokio::test]
async fn test_welcome_spoken_before_listening() {
    let mut h = Harness::with_options(
        Screen::Navigation,
        SessionOptions::default(),
        MockDetector::default(),
    );
    assert_eq!(h.state(), TurnState::Speaking);
    assert!(!h.asr.is_capturing());
    assert!(h.tts.was_spoken("Currently on the navigation screen"));

    h.finish_speech();
    assert_eq!(h.state(), TurnState::Listening);
    h.assert_consistent();
}

#[tokio::test]
async fn test_set_destination_confirms_then_listens() {
    let mut h = Harness::open(Screen::Navigation);
    h.hear("set destination main street");

    assert_eq!(h.session.vars.destination, "mainstreet");
    assert_eq!(h.state(), TurnState::Speaking);
    h.assert_consistent();
    assert_eq!(
        h.tts.get_spoken(),
        vec!["Finding route from current location to mainstreet"]
    );

    h.finish_speech();
    assert_eq!(h.state(), TurnState::Listening);
    h.assert_consistent();
}

#[tokio::test]
async fn test_haptic_feedback_is_silent() {
    let mut h = Harness::open(Screen::Navigation);
    h.hear("activate haptic feedback");

    assert_eq!(h.session.vars.nav_option, Some(NavOption::HapticFeedback));
    assert!(h.tts.get_spoken().is_empty());
    assert_eq!(h.state(), TurnState::Listening);
    h.assert_consistent();
}

#[tokio::test]
async fn test_maps_toggle() {
    let mut h = Harness::open(Screen::Navigation);
    h.hear("enable maps");
    assert!(h.session.vars.show_maps);
    h.hear("disable maps");
    assert!(!h.session.vars.show_maps);
}

#[tokio::test]
async fn test_no_match_apology_then_listen() {
    let mut h = Harness::open(Screen::Home);
    h.send(SessionEvent::Recognizer(RecognizerEvent::Error(
        RecognitionErrorKind::NoMatch,
    )));

    assert_eq!(h.state(), TurnState::Speaking);
    assert_eq!(
        h.tts.get_spoken(),
        vec!["Sorry, I didn't catch that. Please try again."]
    );
    h.finish_speech();
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_no_match_with_mic_off_ends_idle() {
    let mut h = Harness::open(Screen::Home);
    h.send(SessionEvent::Recognizer(RecognizerEvent::Error(
        RecognitionErrorKind::SpeechTimeout,
    )));
    h.send(SessionEvent::Control(ControlEvent::DisableMic));
    h.finish_speech();
    assert_eq!(h.state(), TurnState::Idle);
    h.assert_consistent();
}

#[tokio::test]
async fn test_speech_is_fifo_and_never_overlaps() {
    let mut h = Harness::open(Screen::Register);
    h.hear("email jane at mail dot com");
    h.hear("ignored while speaking");
    // results only count while listening, so queue directly
    h.session
        .controller_mut()
        .speak("second", himba_voice::turn::SpeechKind::Result);
    h.session
        .controller_mut()
        .speak("third", himba_voice::turn::SpeechKind::Result);

    h.drain_speech();
    assert_eq!(
        h.tts.get_spoken(),
        vec!["Email set to jane@mail.com", "second", "third"]
    );
    assert_eq!(h.session.vars.email, "jane@mail.com");
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_disable_mic_while_speaking() {
    let mut h = Harness::open(Screen::Register);
    h.hear("password secret one");
    h.session
        .controller_mut()
        .speak("queued", himba_voice::turn::SpeechKind::Result);

    h.send(SessionEvent::Control(ControlEvent::DisableMic));
    assert_eq!(h.state(), TurnState::Speaking);

    h.finish_speech();
    assert_eq!(h.state(), TurnState::Idle);
    assert_eq!(h.tts.get_spoken(), vec!["Password set"]);
    h.assert_consistent();
}

#[tokio::test]
async fn test_empty_utterance_has_no_side_effect() {
    let mut h = Harness::open(Screen::Welcome);
    h.hear("");
    h.hear("   ");

    assert!(h.tts.get_spoken().is_empty());
    assert!(h.navigator.visited().is_empty());
    assert!(!h.session.vars.awaiting_answer);
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_home_ignores_unknown() {
    let mut h = Harness::open(Screen::Home);
    h.hear("sing me a song");
    assert!(h.tts.get_spoken().is_empty());
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_welcome_clarifies_unknown_then_yes() {
    let mut h = Harness::open(Screen::Welcome);
    h.hear("pizza");
    assert_eq!(
        h.tts.get_spoken(),
        vec!["We heard pizza. This is not a command, so no action will be performed. Would you like to try again?"]
    );
    h.finish_speech();
    assert_eq!(h.state(), TurnState::Listening);

    h.hear("yes");
    assert!(h.tts.was_spoken("Welcome to Himba Vision"));
    h.finish_speech();
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_welcome_clarify_no_releases_mic() {
    let mut h = Harness::open(Screen::Welcome);
    h.hear("pizza");
    h.finish_speech();
    h.hear("no");
    assert!(h.tts.was_spoken("Reverting back to manual mode"));

    h.finish_speech();
    assert_eq!(h.state(), TurnState::Idle);
    assert!(!h.session.controller().mic_enabled());
    h.assert_consistent();
}

#[tokio::test]
async fn test_cancel_stops_speech_without_apology() {
    let mut h = Harness::open(Screen::Home);
    h.hear("what objects can you detect");
    assert_eq!(h.state(), TurnState::Speaking);

    h.session.cancel();
    assert_eq!(h.state(), TurnState::Listening);
    assert_eq!(h.tts.get_spoken().len(), 1);
    assert_eq!(h.tts.log.lock().unwrap().stops, 1);
    h.assert_consistent();
}

#[tokio::test]
async fn test_navigation_stops_listening() {
    let mut h = Harness::open(Screen::Home);
    h.hear("move to profile");
    assert_eq!(h.navigator.visited(), vec![Screen::Profile]);
    assert_eq!(h.state(), TurnState::Idle);
    assert!(h.session.is_leaving());

    // late control requests cannot reopen the mic
    h.send(SessionEvent::Control(ControlEvent::EnableMic));
    assert_eq!(h.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_find_object_runs_detection() {
    let mut h = Harness::open(Screen::Home);
    h.hear("find object bottle with text water");
    assert_eq!(
        h.tts.get_spoken(),
        vec!["Performing object detection on bottle with text water"]
    );
    h.finish_speech();

    h.complete_next().await;
    assert!(h.tts.was_spoken("Distance to bottle"));
    let requests = h.detector.requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![(
            DetectionRequest::Object {
                name: "bottle".into(),
                text: Some("water".into())
            },
            DetectionMode::ObjectDetection
        )]
    );
}

#[tokio::test]
async fn test_unknown_object_suggests_names() {
    let mut h = Harness::open(Screen::Home);
    h.hear("find object bottles");
    let spoken = h.tts.get_spoken();
    assert_eq!(spoken.len(), 1);
    assert!(spoken[0].starts_with("Object does not exist. Suggestions: bottle"));
    assert!(h.detector.requests.lock().unwrap().is_empty());

    h.finish_speech();
    h.hear("find object giraffe");
    assert_eq!(h.tts.get_spoken().last().map(String::as_str), Some("Object does not exist."));
}

#[tokio::test]
async fn test_stale_detection_result_dropped() {
    let mut h = Harness::open(Screen::Home);
    h.hear("find text exit");
    h.finish_speech();
    h.send(SessionEvent::Control(ControlEvent::DisableMic));

    h.complete_next().await;
    assert_eq!(h.tts.get_spoken().len(), 1);
    assert_eq!(h.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_detection_failure_is_spoken() {
    let mut h = Harness::open(Screen::Home);
    h.hear("full analysis");
    h.finish_speech();
    h.complete_next().await;
    assert!(h.tts.was_spoken("detection is not available"));
    h.finish_speech();
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_segmentation_unavailable_keeps_mode() {
    let mut h = Harness::open(Screen::Home);
    h.hear("activate segmentation");
    assert_eq!(h.session.vars.mode, DetectionMode::ObjectDetection);
    assert!(h.tts.was_spoken("not available"));
}

#[tokio::test]
async fn test_segmentation_available_switches_mode() {
    let detector = MockDetector {
        segmentation_online: true,
        ..MockDetector::default()
    };
    let options = SessionOptions {
        speak_welcome: false,
        ..SessionOptions::default()
    };
    let mut h = Harness::with_options(Screen::Navigation, options, detector);
    h.hear("activate segmentation");
    assert_eq!(h.session.vars.mode, DetectionMode::ImageSegmentation);
    assert_eq!(h.tts.get_spoken(), vec!["Image Segmentation activated"]);
}

#[tokio::test]
async fn test_register_lists_empty_fields() {
    let mut h = Harness::open(Screen::Register);
    h.hear("email jane at mail dot com");
    h.finish_speech();
    h.hear("done");
    assert_eq!(
        h.tts.get_spoken().last().map(String::as_str),
        Some("The following fields are empty: password, emergencyContactEmail, fullName")
    );
    assert!(h.account.registered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_register_submits_and_goes_home() {
    let mut h = Harness::open(Screen::Register);
    for line in [
        "name jane doe",
        "email jane at mail dot com",
        "password secret one",
        "emergency email mum at mail dot com",
    ] {
        h.hear(line);
        h.finish_speech();
    }
    h.hear("finished");
    h.complete_next().await;

    let registered = h.account.registered.lock().unwrap().clone();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].full_name, "jane doe");
    assert_eq!(registered[0].emergency_email, "mum@mail.com");
    assert_eq!(h.navigator.visited(), vec![Screen::Home]);
}

#[tokio::test]
async fn test_log_out_returns_to_welcome() {
    let mut h = Harness::open(Screen::Profile);
    h.hear("log out");
    h.complete_next().await;
    assert_eq!(*h.account.log_outs.lock().unwrap(), 1);
    assert_eq!(h.navigator.visited(), vec![Screen::Welcome]);
}

#[tokio::test]
async fn test_segmentation_key_saved_on_submit() {
    let mut h = Harness::open(Screen::Profile);
    h.hear("set segmentation key ab12 dash x9");
    h.finish_speech();
    h.hear("submit");
    assert!(h.tts.was_spoken("Segmentation key saved"));
    assert_eq!(h.profile.load().unwrap().segmentation_key, "ab12-x9");
}

#[tokio::test]
async fn test_voice_control_flag_persisted() {
    let mut h = Harness::open(Screen::Home);
    h.hear("disable voice control");
    assert_eq!(h.state(), TurnState::Idle);
    assert!(!h.profile.load().unwrap().voice_control);

    h.session.controller_mut().enable_mic();
    h.hear("activate voice control");
    assert!(h.profile.load().unwrap().voice_control);
    assert_eq!(h.state(), TurnState::Listening);
}

#[tokio::test]
async fn test_suspend_and_resume_rebinds_handles() {
    let mut h = Harness::open(Screen::Home);
    h.send(SessionEvent::Control(ControlEvent::Pause));
    assert_eq!(h.state(), TurnState::Suspended);
    assert_eq!(h.asr.log.lock().unwrap().destroyed, 1);

    h.send(SessionEvent::Control(ControlEvent::Resume));
    assert_eq!(h.state(), TurnState::Listening);
    assert_eq!(h.asr.log.lock().unwrap().created, 2);
    h.assert_consistent();
}

#[tokio::test]
async fn test_resume_while_active_keeps_handles() {
    let mut h = Harness::open(Screen::Home);
    h.send(SessionEvent::Control(ControlEvent::Resume));

    assert_eq!(h.state(), TurnState::Listening);
    assert_eq!(h.asr.log.lock().unwrap().created, 1);
    assert_eq!(h.asr.log.lock().unwrap().destroyed, 0);
    h.assert_consistent();
}

#[tokio::test]
async fn test_stale_synthesizer_done_ignored() {
    let mut h = Harness::open(Screen::Home);
    h.hear("find text exit");
    h.send(SessionEvent::Synthesizer(SynthesizerEvent::Done(
        himba_voice::tts::UtteranceId(999),
    )));
    assert_eq!(h.state(), TurnState::Speaking);
}

#[tokio::test]
async fn test_exit_and_close_release_handles() {
    let mut h = Harness::open(Screen::Home);
    assert!(!h.send(SessionEvent::Control(ControlEvent::Exit)));
    h.session.close();
    assert_eq!(h.asr.log.lock().unwrap().destroyed, 1);
    assert!(!h.asr.is_capturing());
}
