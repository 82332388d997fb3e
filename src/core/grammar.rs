//! Command Grammar
//!
//! A prioritized table of (matcher, extractor, builder) rules shared by every
//! screen. Each screen activates its own subset.

use crate::commands::{Command, DetectionMode, DetectionRequest, Field, NavOption, Screen};
use crate::core::text_normalizer::{normalize_argument, strip_through_last, ArgumentStyle};
use lazy_static::lazy_static;
use regex::Regex;

/// Evaluation tiers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    /// Turn and session control: cancel, mic toggles, log out
    Control = 0,
    /// Moving between screens
    Navigation = 1,
    /// Commands carrying a free-text argument
    Parametric = 2,
    /// Mode, option and action keywords
    Setting = 3,
}

/// Decides whether a rule applies to an utterance
#[derive(Debug)]
pub enum Matcher {
    /// Any of these phrases appears as whole words
    Phrases(&'static [&'static str]),
    /// Regular expression over the whole utterance
    Pattern(Regex),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Phrases(phrases) => phrases.iter().any(|p| contains_phrase(text, p)),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }
}

/// Produces the command once a rule matched
pub enum Builder {
    /// Literal command
    Fixed(Command),
    /// Strip a prefix phrase, clean the remainder, wrap it
    Argument {
        prefixes: &'static [&'static str],
        style: ArgumentStyle,
        build: fn(String) -> Command,
    },
    /// Rule-specific extraction
    Extract(fn(&str) -> Option<Command>),
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Builder::Fixed(cmd) => f.debug_tuple("Fixed").field(cmd).finish(),
            Builder::Argument {
                prefixes, style, ..
            } => f
                .debug_struct("Argument")
                .field("prefixes", prefixes)
                .field("style", style)
                .finish(),
            Builder::Extract(_) => f.write_str("Extract"),
        }
    }
}

impl Builder {
    fn build(&self, text: &str) -> Option<Command> {
        match self {
            Builder::Fixed(cmd) => Some(cmd.clone()),
            Builder::Argument {
                prefixes,
                style,
                build,
            } => {
                let argument = normalize_argument(&strip_through_last(text, prefixes), *style);
                if argument.is_empty() {
                    None
                } else {
                    Some(build(argument))
                }
            }
            Builder::Extract(extract) => extract(text),
        }
    }
}

/// One grammar entry
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub priority: Priority,
    pub screens: &'static [Screen],
    pub matcher: Matcher,
    pub builder: Builder,
}

impl Rule {
    /// Build the command if this rule applies
    pub fn apply(&self, text: &str) -> Option<Command> {
        if self.matcher.matches(text) {
            self.builder.build(text)
        } else {
            None
        }
    }

    /// Phrase used as a recognizer hint
    fn hint(&self) -> Option<&'static str> {
        match self.matcher {
            Matcher::Phrases(phrases) => phrases.first().copied(),
            Matcher::Pattern(_) => None,
        }
    }
}

const ALL: &[Screen] = &[
    Screen::Welcome,
    Screen::SignIn,
    Screen::Register,
    Screen::Home,
    Screen::Navigation,
    Screen::Profile,
];
const SIGNED_IN: &[Screen] = &[Screen::Home, Screen::Navigation, Screen::Profile];
const VISION: &[Screen] = &[Screen::Home, Screen::Navigation];

lazy_static! {
    static ref OBJECT_WITH_TEXT: Regex = Regex::new(
        r"find objects? (?:s )?(.+?) (?:with|which|witch|we) text (.+)"
    )
    .expect("object-with-text pattern is valid");

    static ref RULES: Vec<Rule> = default_rules();
}

fn default_rules() -> Vec<Rule> {
    let mut rules = vec![
        // Control
        Rule {
            name: "cancel",
            priority: Priority::Control,
            screens: ALL,
            matcher: Matcher::Phrases(&["cancel"]),
            builder: Builder::Fixed(Command::Cancel),
        },
        Rule {
            name: "disable_voice_control",
            priority: Priority::Control,
            screens: ALL,
            matcher: Matcher::Phrases(&[
                "disable voice control",
                "disables voice control",
                "disabled voice control",
            ]),
            builder: Builder::Fixed(Command::ToggleMic(false)),
        },
        Rule {
            name: "activate_voice_control",
            priority: Priority::Control,
            screens: ALL,
            matcher: Matcher::Phrases(&[
                "activate voice control",
                "activates voice control",
                "enable voice control",
            ]),
            builder: Builder::Fixed(Command::ToggleMic(true)),
        },
        Rule {
            name: "log_out",
            priority: Priority::Control,
            screens: SIGNED_IN,
            matcher: Matcher::Phrases(&["log out", "log me out", "sign out"]),
            builder: Builder::Fixed(Command::LogOut),
        },
        // Navigation
        Rule {
            name: "move_to_navigation",
            priority: Priority::Navigation,
            screens: &[Screen::Home, Screen::Profile],
            matcher: Matcher::Phrases(&["move to navigation"]),
            builder: Builder::Fixed(Command::Navigate(Screen::Navigation)),
        },
        Rule {
            name: "move_to_profile",
            priority: Priority::Navigation,
            screens: VISION,
            matcher: Matcher::Phrases(&["move to profile"]),
            builder: Builder::Fixed(Command::Navigate(Screen::Profile)),
        },
        Rule {
            name: "move_to_home",
            priority: Priority::Navigation,
            screens: &[Screen::Navigation, Screen::Profile],
            matcher: Matcher::Phrases(&["move to home"]),
            builder: Builder::Fixed(Command::Navigate(Screen::Home)),
        },
        Rule {
            name: "sign_in",
            priority: Priority::Navigation,
            screens: &[Screen::Welcome],
            matcher: Matcher::Phrases(&[
                "sign in",
                "sign-in",
                "sign me in",
                "log in",
                "login",
                "signing",
            ]),
            builder: Builder::Fixed(Command::Navigate(Screen::SignIn)),
        },
        Rule {
            name: "open_registration",
            priority: Priority::Navigation,
            screens: &[Screen::Welcome],
            matcher: Matcher::Phrases(&[
                "register",
                "create account",
                "register me up",
                "create an account",
                "create my account",
                "sign up",
            ]),
            builder: Builder::Fixed(Command::Navigate(Screen::Register)),
        },
        Rule {
            name: "go_back",
            priority: Priority::Navigation,
            screens: &[Screen::Register, Screen::SignIn],
            matcher: Matcher::Phrases(&["go back", "previous page"]),
            builder: Builder::Fixed(Command::Navigate(Screen::Welcome)),
        },
        // Parametric
        Rule {
            name: "find_object_with_text",
            priority: Priority::Parametric,
            screens: &[Screen::Home],
            matcher: Matcher::Pattern(OBJECT_WITH_TEXT.clone()),
            builder: Builder::Extract(extract_object_with_text),
        },
        Rule {
            name: "find_object",
            priority: Priority::Parametric,
            screens: &[Screen::Home],
            matcher: Matcher::Phrases(&["find object", "find objects"]),
            builder: Builder::Argument {
                prefixes: &["find object s", "find objects", "find object"],
                style: ArgumentStyle::Words,
                build: |name| Command::Detect(DetectionRequest::Object { name, text: None }),
            },
        },
        Rule {
            name: "find_text",
            priority: Priority::Parametric,
            screens: &[Screen::Home],
            matcher: Matcher::Phrases(&["find text", "find texts"]),
            builder: Builder::Argument {
                prefixes: &["find texts", "find text"],
                style: ArgumentStyle::Words,
                build: |text| Command::Detect(DetectionRequest::Text(text)),
            },
        },
        Rule {
            name: "set_destination",
            priority: Priority::Parametric,
            screens: &[Screen::Navigation],
            matcher: Matcher::Phrases(&[
                "set destination",
                "set destinations",
                "destination",
                "destinations",
                "go to",
            ]),
            builder: Builder::Argument {
                prefixes: &[
                    "set destinations",
                    "set destination",
                    "destinations",
                    "destination",
                    "go to",
                ],
                style: ArgumentStyle::Compact,
                build: |value| Command::SetField(Field::Destination, value),
            },
        },
        // "emergency email ..." must win over "email ..."
        Rule {
            name: "emergency_email",
            priority: Priority::Parametric,
            screens: &[Screen::Register],
            matcher: Matcher::Phrases(&["emergency"]),
            builder: Builder::Argument {
                prefixes: &["emergency", "email", "parent"],
                style: ArgumentStyle::Address,
                build: |value| Command::SetField(Field::EmergencyEmail, value),
            },
        },
        Rule {
            name: "email",
            priority: Priority::Parametric,
            screens: &[Screen::Register],
            matcher: Matcher::Phrases(&["email"]),
            builder: Builder::Argument {
                prefixes: &["email"],
                style: ArgumentStyle::Address,
                build: |value| Command::SetField(Field::Email, value),
            },
        },
        Rule {
            name: "password",
            priority: Priority::Parametric,
            screens: &[Screen::Register],
            matcher: Matcher::Phrases(&["password"]),
            builder: Builder::Argument {
                prefixes: &["password"],
                style: ArgumentStyle::Address,
                build: |value| Command::SetField(Field::Password, value),
            },
        },
        Rule {
            name: "full_name",
            priority: Priority::Parametric,
            screens: &[Screen::Register],
            matcher: Matcher::Phrases(&["name", "full name", "fullname"]),
            builder: Builder::Argument {
                prefixes: &["full name is", "name is", "full name", "fullname", "name"],
                style: ArgumentStyle::Words,
                build: |value| Command::SetField(Field::FullName, value),
            },
        },
        Rule {
            name: "segmentation_key",
            priority: Priority::Parametric,
            screens: &[Screen::Profile],
            matcher: Matcher::Phrases(&[
                "set segmentation key",
                "set segmentation",
                "segmentation key",
            ]),
            builder: Builder::Argument {
                prefixes: &["set segmentation key", "segmentation key", "set segmentation"],
                style: ArgumentStyle::Key,
                build: |value| Command::SetField(Field::SegmentationKey, value),
            },
        },
        // Settings and actions
        Rule {
            name: "list_objects",
            priority: Priority::Setting,
            screens: &[Screen::Home],
            matcher: Matcher::Phrases(&["what objects can you detect"]),
            builder: Builder::Fixed(Command::ListObjects),
        },
        Rule {
            name: "full_analysis",
            priority: Priority::Setting,
            screens: &[Screen::Home],
            matcher: Matcher::Phrases(&["full analysis", "search"]),
            builder: Builder::Fixed(Command::Detect(DetectionRequest::FullAnalysis)),
        },
        Rule {
            name: "activate_segmentation",
            priority: Priority::Setting,
            screens: VISION,
            matcher: Matcher::Phrases(&["activate image segmentation", "activate segmentation"]),
            builder: Builder::Fixed(Command::SetMode(DetectionMode::ImageSegmentation)),
        },
        Rule {
            name: "activate_detection",
            priority: Priority::Setting,
            screens: VISION,
            matcher: Matcher::Phrases(&[
                "activate object detection",
                "activate detection",
                "activates detection",
            ]),
            builder: Builder::Fixed(Command::SetMode(DetectionMode::ObjectDetection)),
        },
        Rule {
            name: "minimal_navigation",
            priority: Priority::Setting,
            screens: &[Screen::Navigation],
            matcher: Matcher::Phrases(&[
                "activate minimal navigation",
                "activate minimal",
                "activate minimum",
                "activate basic",
            ]),
            builder: Builder::Fixed(Command::SetOption(NavOption::MinimalNavigation)),
        },
        Rule {
            name: "maximal_navigation",
            priority: Priority::Setting,
            screens: &[Screen::Navigation],
            matcher: Matcher::Phrases(&[
                "activate maximal navigation",
                "activate maximal",
                "activate maximum",
                "activate detailed",
            ]),
            builder: Builder::Fixed(Command::SetOption(NavOption::MaximalNavigation)),
        },
        Rule {
            name: "haptic_feedback",
            priority: Priority::Setting,
            screens: &[Screen::Navigation],
            matcher: Matcher::Phrases(&[
                "activate haptic feedback",
                "activate haptic",
                "activate vibration",
                "activate vibrations",
            ]),
            builder: Builder::Fixed(Command::SetOption(NavOption::HapticFeedback)),
        },
        Rule {
            name: "show_maps",
            priority: Priority::Setting,
            screens: &[Screen::Navigation],
            matcher: Matcher::Phrases(&["enable maps"]),
            builder: Builder::Fixed(Command::SetOption(NavOption::ShowMaps)),
        },
        Rule {
            name: "hide_maps",
            priority: Priority::Setting,
            screens: &[Screen::Navigation],
            matcher: Matcher::Phrases(&["disable maps"]),
            builder: Builder::Fixed(Command::SetOption(NavOption::HideMaps)),
        },
        Rule {
            name: "finish_registration",
            priority: Priority::Setting,
            screens: &[Screen::Register],
            matcher: Matcher::Phrases(&["register", "finished", "done"]),
            builder: Builder::Fixed(Command::Submit),
        },
        Rule {
            name: "submit_key",
            priority: Priority::Setting,
            screens: &[Screen::Profile],
            matcher: Matcher::Phrases(&["submit"]),
            builder: Builder::Fixed(Command::Submit),
        },
        // "hmm hmm" is a no, a single "hmm" is a yes
        Rule {
            name: "answer_no",
            priority: Priority::Setting,
            screens: &[Screen::Welcome],
            matcher: Matcher::Phrases(&["no", "nah", "hmm hmm"]),
            builder: Builder::Fixed(Command::Answer(false)),
        },
        Rule {
            name: "answer_yes",
            priority: Priority::Setting,
            screens: &[Screen::Welcome],
            matcher: Matcher::Phrases(&["yes", "yeah", "hmm"]),
            builder: Builder::Fixed(Command::Answer(true)),
        },
    ];

    // Stable: table order breaks ties within a tier
    rules.sort_by_key(|rule| rule.priority);
    rules
}

fn extract_object_with_text(text: &str) -> Option<Command> {
    let caps = OBJECT_WITH_TEXT.captures(text)?;
    let name = normalize_argument(caps.get(1)?.as_str(), ArgumentStyle::Words);
    let label = normalize_argument(caps.get(2)?.as_str(), ArgumentStyle::Words);
    if name.is_empty() || label.is_empty() {
        return None;
    }
    Some(Command::Detect(DetectionRequest::Object {
        name,
        text: Some(label),
    }))
}

/// Whole-word phrase containment
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    format!(" {} ", text).contains(&format!(" {} ", phrase))
}

/// The rules active for one screen, in evaluation order
#[derive(Debug, Clone)]
pub struct Grammar {
    screen: Screen,
    rules: Vec<&'static Rule>,
}

impl Grammar {
    /// Grammar subset for a screen
    pub fn for_screen(screen: Screen) -> Self {
        let rules = RULES
            .iter()
            .filter(|rule| rule.screens.contains(&screen))
            .collect();
        Self { screen, rules }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn rules(&self) -> &[&'static Rule] {
        &self.rules
    }

    /// First rule (in priority order) that yields a command
    pub fn first_match(&self, text: &str) -> Option<(&'static str, Command)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(text).map(|cmd| (rule.name, cmd)))
    }

    /// Phrases handed to the recognizer as biasing hints
    pub fn hints(&self) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.hint())
            .map(str::to_string)
            .collect()
    }
}
