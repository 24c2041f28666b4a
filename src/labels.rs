//! Class labels and renderer-facing detection records.

use std::fmt;

use crate::rescale::SelectedBox;

const COCO_NAMES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// A class label: a name when one is known, otherwise the numeric id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Name(String),
    Id(u32),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Name(name) => f.write_str(name),
            Label::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Lookup table from class id to name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels {
    names: Vec<String>,
}

impl Labels {
    /// Creates a table where `names[i]` labels class `i`.
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// The 80 COCO class names in training order.
    pub fn coco() -> Self {
        Self::new(COCO_NAMES.iter().map(|name| name.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    /// Resolves `class_id`, falling back to the numeric id.
    pub fn label_for(&self, class_id: u32) -> Label {
        match self.name(class_id) {
            Some(name) => Label::Name(name.to_owned()),
            None => Label::Id(class_id),
        }
    }
}

/// The record handed to renderers: `{ label, probability, bounding }`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderBox {
    pub label: Label,
    pub probability: f32,
    /// `[x, y, w, h]` in original-image pixels.
    pub bounding: [f32; 4],
}

impl RenderBox {
    /// Caption drawn next to the box, e.g. `"person - 87.5%"`.
    pub fn caption(&self) -> String {
        format!("{} - {:.1}%", self.label, self.probability * 100.0)
    }
}

impl SelectedBox {
    /// Converts to the renderer record, resolving the class label.
    pub fn to_render(&self, labels: &Labels) -> RenderBox {
        RenderBox {
            label: labels.label_for(self.class_id),
            probability: self.probability,
            bounding: self.bounding.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Label, Labels};

    #[test]
    fn coco_table_has_eighty_classes() {
        let labels = Labels::coco();
        assert_eq!(labels.len(), 80);
        assert_eq!(labels.name(0), Some("person"));
        assert_eq!(labels.name(79), Some("toothbrush"));
    }

    #[test]
    fn unknown_class_falls_back_to_id() {
        let labels = Labels::new(vec!["cat".into()]);
        assert_eq!(labels.label_for(0), Label::Name("cat".into()));
        assert_eq!(labels.label_for(7), Label::Id(7));
        assert_eq!(Label::Id(7).to_string(), "7");
    }
}
