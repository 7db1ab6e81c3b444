use dnschat_domain::{DnsError, DnsQuery, TxtRecordFragment, QTYPE_TXT};
use tracing::debug;

use super::message_builder::HEADER_LEN;

const FLAG_QR: u16 = 0x8000;
const FLAG_TC: u16 = 0x0200;
const POINTER_MASK: u8 = 0xC0;
const MAX_POINTER_JUMPS: usize = 10;

pub struct ResponseParser;

impl ResponseParser {
    /// Extracts every TXT character-string from the answer section.
    ///
    /// Any inconsistency in the buffer fails the whole parse; fragments are
    /// never returned from a truncated or corrupt message.
    pub fn parse(response_bytes: &[u8]) -> Result<Vec<TxtRecordFragment>, DnsError> {
        let mut reader = WireReader::new(response_bytes);
        let header = Header::read(&mut reader)?;

        for _ in 0..header.qdcount {
            reader.skip_name()?;
            reader.skip(4)?;
        }

        read_answers(&mut reader, header.ancount)
    }

    /// Validates `response_bytes` as the answer to `query`, then extracts its TXT strings.
    ///
    /// A non-zero RCODE is reported as `QueryFailed`; every other mismatch is
    /// `InvalidResponse`. An answer without TXT data is `QueryFailed` so that
    /// callers move on to another transport.
    pub fn parse_for(
        query: &DnsQuery,
        response_bytes: &[u8],
    ) -> Result<Vec<TxtRecordFragment>, DnsError> {
        let mut reader = WireReader::new(response_bytes);
        let header = Header::read(&mut reader)?;

        if header.id != query.transaction_id {
            return Err(DnsError::invalid_response(format!(
                "Transaction ID mismatch: expected {}, got {}",
                query.transaction_id, header.id
            )));
        }
        if header.flags & FLAG_QR == 0 {
            return Err(DnsError::invalid_response("Message is not a response"));
        }
        let opcode = (header.flags >> 11) & 0x0F;
        if opcode != 0 {
            return Err(DnsError::invalid_response(format!(
                "Unexpected opcode {}",
                opcode
            )));
        }
        if header.flags & FLAG_TC != 0 {
            return Err(DnsError::invalid_response("Response truncated"));
        }
        let rcode = header.flags & 0x0F;
        if rcode != 0 {
            return Err(DnsError::query_failed(format!("rcode={}", rcode)));
        }
        if header.qdcount != 1 {
            return Err(DnsError::invalid_response(format!(
                "Expected one question, got {}",
                header.qdcount
            )));
        }

        let name = reader.read_name()?;
        let expected = query
            .question_label
            .strip_suffix('.')
            .unwrap_or(&query.question_label);
        if !name.eq_ignore_ascii_case(expected) {
            return Err(DnsError::invalid_response(format!(
                "Question name mismatch: expected '{}', got '{}'",
                expected, name
            )));
        }

        let qtype = reader.u16()?;
        let qclass = reader.u16()?;
        if qtype != query.query_type || qclass != query.query_class {
            return Err(DnsError::invalid_response(format!(
                "Question type mismatch: got type {} class {}",
                qtype, qclass
            )));
        }

        let fragments = read_answers(&mut reader, header.ancount)?;
        if fragments.is_empty() {
            return Err(DnsError::no_records(format!("for {}", expected)));
        }
        Ok(fragments)
    }
}

fn read_answers(
    reader: &mut WireReader<'_>,
    ancount: u16,
) -> Result<Vec<TxtRecordFragment>, DnsError> {
    let mut fragments = Vec::new();

    for _ in 0..ancount {
        reader.skip_name()?;
        let rtype = reader.u16()?;
        let _class = reader.u16()?;
        let _ttl = reader.u32()?;
        let rdlength = reader.u16()? as usize;
        let rdata = reader.take(rdlength)?;

        if rtype == QTYPE_TXT {
            decode_character_strings(rdata, &mut fragments)?;
        }
    }

    debug!(
        answers = ancount,
        fragments = fragments.len(),
        "DNS response parsed"
    );

    Ok(fragments)
}

fn decode_character_strings(
    rdata: &[u8],
    out: &mut Vec<TxtRecordFragment>,
) -> Result<(), DnsError> {
    let mut reader = WireReader::new(rdata);
    while !reader.is_empty() {
        let len = reader.u8()? as usize;
        let text = reader.take(len)?;
        if !text.is_empty() {
            out.push(TxtRecordFragment::new(String::from_utf8_lossy(text)));
        }
    }
    Ok(())
}

struct Header {
    id: u16,
    flags: u16,
    qdcount: u16,
    ancount: u16,
}

impl Header {
    fn read(reader: &mut WireReader<'_>) -> Result<Self, DnsError> {
        if reader.remaining() < HEADER_LEN {
            return Err(DnsError::invalid_response(format!(
                "Response shorter than DNS header: {} bytes",
                reader.remaining()
            )));
        }
        let id = reader.u16()?;
        let flags = reader.u16()?;
        let qdcount = reader.u16()?;
        let ancount = reader.u16()?;
        reader.skip(4)?; // NSCOUNT, ARCOUNT
        Ok(Self {
            id,
            flags,
            qdcount,
            ancount,
        })
    }
}

/// Bounds-checked cursor over a DNS message.
struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DnsError> {
        if self.remaining() < n {
            return Err(DnsError::invalid_response(format!(
                "Buffer underrun at offset {}: need {} bytes, have {}",
                self.pos,
                n,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn skip(&mut self, n: usize) -> Result<(), DnsError> {
        self.take(n).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, DnsError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DnsError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DnsError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Moves past a name without following compression pointers.
    fn skip_name(&mut self) -> Result<(), DnsError> {
        loop {
            let len = self.u8()?;
            match len & POINTER_MASK {
                POINTER_MASK => {
                    self.skip(1)?;
                    return Ok(());
                }
                0 if len == 0 => return Ok(()),
                0 => self.skip(len as usize)?,
                _ => return Err(reserved_label_type(len)),
            }
        }
    }

    /// Reads a name as dotted text, following pointers; the cursor ends after
    /// the name as it appears at the current position.
    fn read_name(&mut self) -> Result<String, DnsError> {
        let mut name = String::new();
        let mut cursor = self.pos;
        let mut resume_at: Option<usize> = None;
        let mut jumps = 0;

        loop {
            let len = *self
                .buf
                .get(cursor)
                .ok_or_else(|| DnsError::invalid_response("Name runs past end of message"))?;

            match len & POINTER_MASK {
                POINTER_MASK => {
                    let low = *self.buf.get(cursor + 1).ok_or_else(|| {
                        DnsError::invalid_response("Compression pointer runs past end of message")
                    })?;
                    jumps += 1;
                    if jumps > MAX_POINTER_JUMPS {
                        return Err(DnsError::invalid_response(
                            "Too many compression pointers in name",
                        ));
                    }
                    resume_at.get_or_insert(cursor + 2);
                    cursor = (((len & !POINTER_MASK) as usize) << 8) | low as usize;
                }
                0 if len == 0 => {
                    cursor += 1;
                    break;
                }
                0 => {
                    let start = cursor + 1;
                    let end = start + len as usize;
                    let label = self.buf.get(start..end).ok_or_else(|| {
                        DnsError::invalid_response("Label runs past end of message")
                    })?;
                    if !name.is_empty() {
                        name.push('.');
                    }
                    name.push_str(&String::from_utf8_lossy(label));
                    cursor = end;
                }
                _ => return Err(reserved_label_type(len)),
            }
        }

        self.pos = resume_at.unwrap_or(cursor);
        Ok(name)
    }
}

fn reserved_label_type(len: u8) -> DnsError {
    DnsError::invalid_response(format!("Unsupported label type 0x{:02x}", len & POINTER_MASK))
}
