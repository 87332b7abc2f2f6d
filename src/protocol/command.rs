//! Command definitions
//!
//! Every message on the wire carries one of these codes in its envelope.
//! The high byte groups the request family, the low byte the request kind
//! (`0x_04` success, `0x_05` failure).

use std::fmt;

/// Command codes of the buffer protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Command {
    PutHdr = 0x101,
    PutDat = 0x102,
    PutEvt = 0x103,
    PutOk = 0x104,
    PutErr = 0x105,

    GetHdr = 0x201,
    GetDat = 0x202,
    GetEvt = 0x203,
    GetOk = 0x204,
    GetErr = 0x205,

    FlushHdr = 0x301,
    FlushDat = 0x302,
    FlushEvt = 0x303,
    FlushOk = 0x304,
    FlushErr = 0x305,

    WaitDat = 0x402,
    WaitOk = 0x404,
    WaitErr = 0x405,
}

impl Command {
    /// Wire code of this command
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Protocol name of this command (e.g. `GET_OK`)
    pub fn name(self) -> &'static str {
        match self {
            Command::PutHdr => "PUT_HDR",
            Command::PutDat => "PUT_DAT",
            Command::PutEvt => "PUT_EVT",
            Command::PutOk => "PUT_OK",
            Command::PutErr => "PUT_ERR",
            Command::GetHdr => "GET_HDR",
            Command::GetDat => "GET_DAT",
            Command::GetEvt => "GET_EVT",
            Command::GetOk => "GET_OK",
            Command::GetErr => "GET_ERR",
            Command::FlushHdr => "FLUSH_HDR",
            Command::FlushDat => "FLUSH_DAT",
            Command::FlushEvt => "FLUSH_EVT",
            Command::FlushOk => "FLUSH_OK",
            Command::FlushErr => "FLUSH_ERR",
            Command::WaitDat => "WAIT_DAT",
            Command::WaitOk => "WAIT_OK",
            Command::WaitErr => "WAIT_ERR",
        }
    }

    /// The single success response expected for a request, if this is a request
    pub fn expected_response(self) -> Option<Command> {
        match self {
            Command::PutHdr | Command::PutDat | Command::PutEvt => Some(Command::PutOk),
            Command::GetHdr | Command::GetDat | Command::GetEvt => Some(Command::GetOk),
            Command::FlushHdr | Command::FlushDat | Command::FlushEvt => Some(Command::FlushOk),
            Command::WaitDat => Some(Command::WaitOk),
            _ => None,
        }
    }
}

impl TryFrom<u16> for Command {
    type Error = u16;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        let command = match code {
            0x101 => Command::PutHdr,
            0x102 => Command::PutDat,
            0x103 => Command::PutEvt,
            0x104 => Command::PutOk,
            0x105 => Command::PutErr,
            0x201 => Command::GetHdr,
            0x202 => Command::GetDat,
            0x203 => Command::GetEvt,
            0x204 => Command::GetOk,
            0x205 => Command::GetErr,
            0x301 => Command::FlushHdr,
            0x302 => Command::FlushDat,
            0x303 => Command::FlushEvt,
            0x304 => Command::FlushOk,
            0x305 => Command::FlushErr,
            0x402 => Command::WaitDat,
            0x404 => Command::WaitOk,
            0x405 => Command::WaitErr,
            other => return Err(other),
        };
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:03x})", self.name(), self.code())
    }
}
