//! Detection catalogs
//!
//! Object names known to the on-device detector (COCO) and to the
//! server-side panoptic segmentation model (COCO things plus stuff classes).

use super::Detector;
use crate::commands::{DetectionMode, DetectionRequest};
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use tracing::debug;

pub const COCO_OBJECTS: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Stuff classes only the segmentation model knows (sky and ceiling excluded)
pub const PANOPTIC_STUFF: &[&str] = &[
    "things", "banner", "blanket", "bridge", "cardboard", "counter", "curtain", "door-stuff",
    "floor-wood", "flower", "fruit", "gravel", "house", "light", "mirror-stuff", "net", "pillow",
    "platform", "playingfield", "railroad", "river", "road", "roof", "sand", "sea", "shelf", "snow",
    "stairs", "tent", "towel", "wall-brick", "wall-stone", "wall-tile", "wall-wood", "water",
    "window-blind", "window", "tree", "fence", "cabinet", "table", "floor", "pavement", "mountain",
    "grass", "dirt", "paper", "food", "building", "rock", "wall", "rug",
];

pub fn catalog_for(mode: DetectionMode) -> Vec<String> {
    let mut names: Vec<String> = COCO_OBJECTS.iter().map(|name| name.to_string()).collect();
    if mode == DetectionMode::ImageSegmentation {
        names.extend(PANOPTIC_STUFF.iter().map(|name| name.to_string()));
    }
    names
}

/// Knows the catalogs but has no camera attached
#[derive(Debug, Clone, Default)]
pub struct CatalogDetector {
    /// Whether a segmentation server is reachable
    segmentation_online: bool,
}

impl CatalogDetector {
    pub fn new(segmentation_online: bool) -> Self {
        Self {
            segmentation_online,
        }
    }
}

#[async_trait]
impl Detector for CatalogDetector {
    fn catalog(&self, mode: DetectionMode) -> Vec<String> {
        catalog_for(mode)
    }

    fn is_available(&self, mode: DetectionMode) -> bool {
        match mode {
            DetectionMode::ObjectDetection => true,
            DetectionMode::ImageSegmentation => self.segmentation_online,
        }
    }

    async fn detect(&self, request: &DetectionRequest, mode: DetectionMode) -> VoiceResult<String> {
        debug!("Detection requested: {:?} ({})", request, mode.display_name());
        Err(VoiceError::collaborator("detector", "no camera attached"))
    }
}
