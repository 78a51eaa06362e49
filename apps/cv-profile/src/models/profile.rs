use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sections::SectionMap;

/// Profile photo written next to the uploads as `<stem>_profile_photo.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPhoto {
    pub filename: String,
    pub path: PathBuf,
}

/// Everything the "create profile" page needs to pre-fill its form.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDraft {
    pub source_filename: String,
    pub sections: SectionMap,
    pub photo_filename: Option<String>,
    /// User-facing messages for parts of the CV that could not be read.
    pub notices: Vec<String>,
}

impl ProfileDraft {
    pub fn has_photo(&self) -> bool {
        self.photo_filename.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::split_sections;

    #[test]
    fn test_draft_serializes_sections_as_object() {
        let draft = ProfileDraft {
            source_filename: "cv.pdf".to_string(),
            sections: split_sections("EDUCATION\nBSc CS\n"),
            photo_filename: None,
            notices: vec![],
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["sections"]["EDUCATION"], "BSc CS");
        assert!(json["photo_filename"].is_null());
        assert!(!draft.has_photo());
    }
}
