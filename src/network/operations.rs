//! Buffer operations
//!
//! The public request kinds, each a single transaction on the connection.

use super::Connection;
use crate::error::{BufferError, Result};
use crate::protocol::{
    decode_data, decode_header, decode_wait_response, encode_data_request,
    encode_event_request, encode_get_header_request, encode_header_request, encode_message,
    encode_wait_request, BufferCounts, ByteOrder, Command, Event, Header, SampleMatrix, WaitRequest,
};

impl Connection {
    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    /// Fetch the stream header.
    ///
    /// Fails with a protocol error when the server holds no header yet.
    pub fn get_header(&mut self) -> Result<Header> {
        let request = encode_get_header_request(self.byte_order());
        let payload = self.transact(&request, Command::GetOk)?;
        let header = self.decode_or_break(|order| decode_header(order, &payload))?;

        tracing::debug!(
            "Header: {} channels, {} samples, {} events, {} Hz",
            header.channel_count,
            header.sample_count,
            header.event_count,
            header.sampling_frequency_hz
        );
        Ok(header)
    }

    /// Define a new stream with `channel_count` channels
    pub fn put_header(&mut self, channel_count: u32, sampling_frequency_hz: f32) -> Result<()> {
        let request = encode_header_request(self.byte_order(), channel_count, sampling_frequency_hz);
        self.transact(&request, Command::PutOk)?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Fetch samples `begin..=end`
    pub fn get_data(&mut self, begin: u32, end: u32) -> Result<SampleMatrix> {
        if begin > end {
            return Err(BufferError::Validation(format!(
                "invalid sample range {}..={}",
                begin, end
            )));
        }
        self.fetch_data(Some((begin, end)))
    }

    /// Fetch every sample the server currently holds
    pub fn get_all_data(&mut self) -> Result<SampleMatrix> {
        self.fetch_data(None)
    }

    /// Fetch the most recent `count` samples.
    ///
    /// Reads the header first and fails with a validation error when fewer
    /// than `count` samples exist.
    pub fn get_latest_data(&mut self, count: u32) -> Result<SampleMatrix> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let available = self.get_header()?.sample_count;
        if available < count {
            return Err(BufferError::Validation(format!(
                "requested {} samples but only {} available",
                count, available
            )));
        }
        self.fetch_data(Some((available - count, available - 1)))
    }

    fn fetch_data(&mut self, range: Option<(u32, u32)>) -> Result<SampleMatrix> {
        let request = encode_data_request(self.byte_order(), range);
        let payload = self.transact(&request, Command::GetOk)?;
        let samples = self.decode_or_break(|order| decode_data(order, &payload))?;

        tracing::debug!("Received {} samples ({:?})", samples.len(), range);
        Ok(samples)
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    /// Attach a key/value event to the most recent sample.
    ///
    /// Polls the current sample count first; with an empty buffer the event
    /// lands on sample -1.
    pub fn put_event(&mut self, key: &str, value: &str) -> Result<()> {
        let counts = self.wait_data(WaitRequest::poll())?;
        let sample = i32::try_from(counts.samples)
            .map(|n| n - 1)
            .map_err(|_| {
                BufferError::Validation(format!(
                    "sample count {} exceeds the event index range",
                    counts.samples
                ))
            })?;
        if sample < 0 {
            tracing::warn!("Putting event {:?} before any sample was written", key);
        }

        self.put_event_at(&Event::new(key, value, sample))
    }

    /// Send an event with explicit sample, offset and duration
    pub fn put_event_at(&mut self, event: &Event) -> Result<()> {
        let request = encode_event_request(self.byte_order(), event)?;
        self.transact(&request, Command::PutOk)?;

        tracing::debug!("Put event {:?}={:?} at sample {}", event.key, event.value, event.sample);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Flush / Wait
    // -------------------------------------------------------------------------

    /// Discard all samples held by the server
    pub fn flush_data(&mut self) -> Result<()> {
        self.flush(Command::FlushDat)
    }

    /// Discard the header (and with it all samples and events)
    pub fn flush_header(&mut self) -> Result<()> {
        self.flush(Command::FlushHdr)
    }

    /// Discard all events held by the server
    pub fn flush_events(&mut self) -> Result<()> {
        self.flush(Command::FlushEvt)
    }

    fn flush(&mut self, command: Command) -> Result<()> {
        let request = encode_message(self.byte_order(), command, &[]);
        self.transact(&request, Command::FlushOk)?;
        Ok(())
    }

    /// Block until the server holds more samples or events than the given
    /// thresholds, or until the timeout expires, and return the counts
    pub fn wait_data(&mut self, request: WaitRequest) -> Result<BufferCounts> {
        let message = encode_wait_request(self.byte_order(), &request);
        let payload = self.transact(&message, Command::WaitOk)?;
        self.decode_or_break(|order| decode_wait_response(order, &payload))
    }

    /// Run a decoder over a received payload, breaking the connection on failure
    fn decode_or_break<T>(
        &mut self,
        decode: impl FnOnce(ByteOrder) -> Result<T>,
    ) -> Result<T> {
        let result = decode(self.byte_order());
        if let Err(ref e) = result {
            tracing::warn!("Malformed response from {}: {}", self.peer_addr(), e);
            self.mark_broken();
        }
        result
    }
}
