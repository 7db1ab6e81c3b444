/// One character-string extracted from a TXT answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecordFragment {
    pub raw_content: String,
}

impl TxtRecordFragment {
    pub fn new(raw_content: impl Into<String>) -> Self {
        Self {
            raw_content: raw_content.into(),
        }
    }
}

impl From<&str> for TxtRecordFragment {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TxtRecordFragment {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// The `N/M:` prefix of a multi-part fragment. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFragmentId {
    pub index: u32,
    pub total: u32,
    pub content: String,
}
