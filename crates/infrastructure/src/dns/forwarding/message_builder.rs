//! DNS Message Builder
//!
//! Writes TXT queries in RFC 1035 wire format by hand. The engine only ever
//! asks one question of one type, so a full message model is unnecessary.

use bytes::{BufMut, Bytes, BytesMut};
use dnschat_domain::{DnsError, DnsQuery};

use crate::dns::label_codec::MAX_LABEL_LEN;

pub const HEADER_LEN: usize = 12;

/// Longest encoded QNAME, length bytes and terminator included (RFC 1035 §2.3.4).
pub const MAX_NAME_LEN: usize = 255;

/// Standard query with RD set.
const QUERY_FLAGS: u16 = 0x0100;

pub struct MessageBuilder;

impl MessageBuilder {
    /// Random non-zero transaction id, drawn fresh for every attempt.
    pub fn new_transaction_id() -> u16 {
        fastrand::u16(1..)
    }

    /// TXT question for `name` with a fresh transaction id.
    pub fn txt_query(name: &str) -> DnsQuery {
        DnsQuery::txt(Self::new_transaction_id(), name)
    }

    /// Serialises a query: 12-byte header followed by a single question.
    pub fn encode(query: &DnsQuery) -> Result<Bytes, DnsError> {
        let name_len = Self::encoded_name_len(&query.question_label)?;
        let mut buf = BytesMut::with_capacity(HEADER_LEN + name_len + 4);

        buf.put_u16(query.transaction_id);
        buf.put_u16(QUERY_FLAGS);
        buf.put_u16(1); // QDCOUNT
        buf.put_u16(0); // ANCOUNT
        buf.put_u16(0); // NSCOUNT
        buf.put_u16(0); // ARCOUNT

        Self::write_name(&query.question_label, &mut buf);
        buf.put_u16(query.query_type);
        buf.put_u16(query.query_class);

        Ok(buf.freeze())
    }

    /// Size of `name` once encoded, after checking label and name limits.
    pub fn encoded_name_len(name: &str) -> Result<usize, DnsError> {
        let name = name.strip_suffix('.').unwrap_or(name);
        if name.is_empty() {
            return Err(DnsError::query_failed("Query name cannot be empty"));
        }

        let mut total = 1; // root terminator
        for label in name.split('.') {
            if label.is_empty() {
                return Err(DnsError::query_failed(format!(
                    "Empty label in query name '{}'",
                    name
                )));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DnsError::query_failed(format!(
                    "Label exceeds {} bytes: {} bytes",
                    MAX_LABEL_LEN,
                    label.len()
                )));
            }
            total += 1 + label.len();
        }

        if total > MAX_NAME_LEN {
            return Err(DnsError::query_failed(format!(
                "Message too long for a DNS query: name is {} bytes (max {})",
                total, MAX_NAME_LEN
            )));
        }

        Ok(total)
    }

    fn write_name(name: &str, buf: &mut BytesMut) {
        let name = name.strip_suffix('.').unwrap_or(name);
        for label in name.split('.') {
            buf.put_u8(label.len() as u8);
            buf.put_slice(label.as_bytes());
        }
        buf.put_u8(0);
    }
}
