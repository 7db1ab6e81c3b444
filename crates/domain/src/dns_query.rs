use std::sync::Arc;

pub const QTYPE_TXT: u16 = 16;
pub const QCLASS_IN: u16 = 1;

/// A single TXT question. Built once per transport attempt and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub transaction_id: u16,
    pub question_label: Arc<str>,
    pub query_type: u16,
    pub query_class: u16,
}

impl DnsQuery {
    pub fn txt(transaction_id: u16, question_label: impl Into<Arc<str>>) -> Self {
        Self {
            transaction_id,
            question_label: question_label.into(),
            query_type: QTYPE_TXT,
            query_class: QCLASS_IN,
        }
    }
}
