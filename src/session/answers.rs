//! Forced-choice answer keys and their labels

use crate::settings::AnswerChoice;

#[derive(Debug, Clone, Default)]
pub struct AnswerTable {
    choices: Vec<AnswerChoice>,
}

impl AnswerTable {
    pub fn new(choices: Vec<AnswerChoice>) -> Self {
        Self { choices }
    }

    pub fn label(&self, key: char) -> Option<&str> {
        self.choices
            .iter()
            .find(|choice| choice.key == key)
            .map(|choice| choice.label.as_str())
    }

    pub fn choices(&self) -> &[AnswerChoice] {
        &self.choices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CaptureSettings;

    #[test]
    fn default_keys_map_to_labels() {
        let table = AnswerTable::new(CaptureSettings::default().answers);
        assert_eq!(table.label('4'), Some("Interesting / intriguing shape"));
        assert_eq!(table.label('5'), Some("No particular feeling"));
        assert_eq!(table.label('7'), None);
        assert_eq!(table.choices().len(), 5);
    }
}
