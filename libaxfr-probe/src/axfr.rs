use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, Record, RecordType};
use hickory_proto::ProtoError;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Zone transfer refused: {0}")]
    Refused(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Malformed DNS message: {0}")]
    Proto(#[from] ProtoError),
    #[error("Unexpected response: {0}")]
    Protocol(String),
    #[error("Connection closed before the closing SOA ({0} records received)")]
    Incomplete(usize),
}

impl TransferError {
    pub fn is_refused(&self) -> bool {
        matches!(self, TransferError::Refused(_))
    }
}

/// Pulls a full copy of a zone from one server.
#[async_trait]
pub trait ZoneTransfer: Send + Sync {
    /// Every record of `domain` as served by `server`, opening SOA first and
    /// without the closing SOA.
    async fn transfer(&self, server: SocketAddr, domain: &str) -> Result<Vec<Record>, TransferError>;
}

/// Parses `domain` as an absolute name.
pub fn zone_name(domain: &str) -> Result<Name, ProtoError> {
    if domain.ends_with('.') {
        Name::from_ascii(domain)
    } else {
        Name::from_ascii(format!("{}.", domain))
    }
}

/// Wire form of an AXFR question for `zone`.
pub fn axfr_query(zone: &Name, id: u16) -> Result<Vec<u8>, ProtoError> {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false);
    message.add_query(Query::query(zone.clone(), RecordType::AXFR));
    message.to_vec()
}

/// Accumulates the responses of one AXFR exchange.
///
/// The first answer must be the SOA of the zone, otherwise the server is
/// treated as refusing. The exchange is over at the next SOA for the zone.
#[derive(Debug)]
pub struct TransferCollector {
    zone: Name,
    id: u16,
    records: Vec<Record>,
    messages: usize,
    done: bool,
}

impl TransferCollector {
    pub fn new(zone: Name, id: u16) -> Self {
        Self {
            zone,
            id,
            records: Vec::new(),
            messages: 0,
            done: false,
        }
    }

    /// Number of records kept so far.
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Feeds one response message. Returns `true` once the closing SOA has
    /// been seen.
    pub fn push(&mut self, mut message: Message) -> Result<bool, TransferError> {
        if message.id() != self.id {
            return Err(TransferError::Protocol(format!(
                "response id {} does not match query id {}",
                message.id(),
                self.id
            )));
        }

        let started = !self.records.is_empty();
        let code = message.response_code();
        if code != ResponseCode::NoError {
            if started {
                return Err(TransferError::Protocol(format!(
                    "server answered {} in the middle of the transfer",
                    code
                )));
            }
            return Err(TransferError::Refused(code.to_string()));
        }

        self.messages += 1;
        let answers = message.take_answers();
        if !started && answers.is_empty() {
            return Err(TransferError::Refused("empty answer".to_string()));
        }

        for record in answers {
            let is_zone_soa =
                record.record_type() == RecordType::SOA && record.name() == &self.zone;

            if self.records.is_empty() {
                if !is_zone_soa {
                    return Err(TransferError::Refused(format!(
                        "first answer is {} {} instead of the zone SOA",
                        record.name(),
                        record.record_type()
                    )));
                }
                self.records.push(record);
                continue;
            }

            if is_zone_soa {
                self.done = true;
                break;
            }
            self.records.push(record);
        }

        Ok(self.done)
    }

    pub fn finish(self) -> Result<Vec<Record>, TransferError> {
        if !self.done {
            return Err(TransferError::Incomplete(self.records.len()));
        }
        debug!(
            zone = %self.zone,
            messages = self.messages,
            records = self.records.len(),
            "Transfer complete"
        );
        Ok(self.records)
    }
}

/// AXFR over a fresh TCP connection per transfer.
#[derive(Debug, Clone)]
pub struct TcpTransfer {
    timeout: Duration,
    deadline: Duration,
}

impl TcpTransfer {
    /// `timeout` bounds the connect and every single read or write,
    /// `deadline` the whole exchange.
    pub fn new(timeout: Duration, deadline: Duration) -> Self {
        Self { timeout, deadline }
    }

    async fn within<T, F>(&self, fut: F) -> Result<T, TransferError>
    where
        F: Future<Output = io::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(TransferError::Io(e)),
            Err(_) => Err(TransferError::Timeout(self.timeout)),
        }
    }

    async fn exchange(&self, server: SocketAddr, zone: Name) -> Result<Vec<Record>, TransferError> {
        let id = fastrand::u16(..);
        let query = axfr_query(&zone, id)?;
        let len = u16::try_from(query.len())
            .map_err(|_| TransferError::Protocol("query does not fit a TCP frame".to_string()))?;

        let mut stream = self.within(TcpStream::connect(server)).await?;

        let mut frame = Vec::with_capacity(query.len() + 2);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(&query);
        self.within(stream.write_all(&frame)).await?;

        let mut collector = TransferCollector::new(zone, id);
        loop {
            let mut prefix = [0u8; 2];
            match self.within(stream.read_exact(&mut prefix)).await {
                Ok(_) => {}
                Err(TransferError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(TransferError::Incomplete(collector.len()));
                }
                Err(e) => return Err(e),
            }

            let mut buf = vec![0u8; u16::from_be_bytes(prefix) as usize];
            self.within(stream.read_exact(&mut buf)).await?;
            debug!(%server, bytes = buf.len(), "Received transfer message");

            if collector.push(Message::from_vec(&buf)?)? {
                break;
            }
        }

        collector.finish()
    }
}

#[async_trait]
impl ZoneTransfer for TcpTransfer {
    async fn transfer(&self, server: SocketAddr, domain: &str) -> Result<Vec<Record>, TransferError> {
        let zone = zone_name(domain)?;
        match tokio::time::timeout(self.deadline, self.exchange(server, zone)).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::Timeout(self.deadline)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::{A, NS, SOA};
    use hickory_proto::rr::RData;
    use std::net::Ipv4Addr;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn soa() -> Record {
        Record::from_rdata(
            name("example.com."),
            3600,
            RData::SOA(SOA::new(
                name("ns1.example.com."),
                name("hostmaster.example.com."),
                2024010101,
                3600,
                900,
                604800,
                86400,
            )),
        )
    }

    fn a(owner: &str, last: u8) -> Record {
        Record::from_rdata(name(owner), 3600, RData::A(A(Ipv4Addr::new(192, 0, 2, last))))
    }

    fn response(id: u16, code: ResponseCode, answers: Vec<Record>) -> Message {
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Response)
            .set_response_code(code);
        message.insert_answers(answers);
        message
    }

    #[test]
    fn query_asks_for_axfr_of_absolute_zone() {
        let zone = zone_name("example.com").unwrap();
        let bytes = axfr_query(&zone, 4242).unwrap();
        let message = Message::from_vec(&bytes).unwrap();

        assert_eq!(message.id(), 4242);
        assert_eq!(message.message_type(), MessageType::Query);
        assert!(!message.recursion_desired());
        assert_eq!(message.queries().len(), 1);
        assert_eq!(message.queries()[0].query_type(), RecordType::AXFR);
        assert_eq!(message.queries()[0].name(), &name("example.com."));
    }

    #[test]
    fn refused_rcode_is_a_refusal() {
        let mut collector = TransferCollector::new(name("example.com."), 7);
        let err = collector
            .push(response(7, ResponseCode::Refused, vec![]))
            .unwrap_err();
        assert!(err.is_refused());
    }

    #[test]
    fn empty_first_answer_is_a_refusal() {
        let mut collector = TransferCollector::new(name("example.com."), 7);
        let err = collector
            .push(response(7, ResponseCode::NoError, vec![]))
            .unwrap_err();
        assert!(err.is_refused());
    }

    #[test]
    fn answer_not_opening_with_soa_is_a_refusal() {
        let mut collector = TransferCollector::new(name("example.com."), 7);
        let err = collector
            .push(response(7, ResponseCode::NoError, vec![a("www.example.com.", 1)]))
            .unwrap_err();
        assert!(err.is_refused());
    }

    #[test]
    fn mismatched_id_is_a_failure_not_a_refusal() {
        let mut collector = TransferCollector::new(name("example.com."), 7);
        let err = collector
            .push(response(8, ResponseCode::Refused, vec![]))
            .unwrap_err();
        assert!(!err.is_refused());
    }

    #[test]
    fn transfer_spanning_messages_ends_at_closing_soa() {
        let mut collector = TransferCollector::new(name("example.com."), 7);

        let first = response(
            7,
            ResponseCode::NoError,
            vec![
                soa(),
                Record::from_rdata(name("example.com."), 3600, RData::NS(NS(name("ns1.example.com.")))),
            ],
        );
        assert!(!collector.push(first).unwrap());

        let second = response(7, ResponseCode::NoError, vec![a("www.example.com.", 2), soa()]);
        assert!(collector.push(second).unwrap());

        let records = collector.finish().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].record_type(), RecordType::SOA);
        assert_eq!(records[2].record_type(), RecordType::A);
    }

    #[test]
    fn error_after_start_is_a_failure() {
        let mut collector = TransferCollector::new(name("example.com."), 7);
        collector
            .push(response(7, ResponseCode::NoError, vec![soa()]))
            .unwrap();
        let err = collector
            .push(response(7, ResponseCode::ServFail, vec![]))
            .unwrap_err();
        assert!(!err.is_refused());
    }

    #[test]
    fn unfinished_transfer_is_incomplete() {
        let mut collector = TransferCollector::new(name("example.com."), 7);
        collector
            .push(response(7, ResponseCode::NoError, vec![soa(), a("www.example.com.", 1)]))
            .unwrap();
        assert!(matches!(collector.finish(), Err(TransferError::Incomplete(2))));
    }
}
