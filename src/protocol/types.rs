//! Wire-level enumerations
//!
//! Op codes, status codes, value type tags and scan operators, each with
//! its fixed `i32` wire value.

use std::fmt;

/// Row identifier assigned by the server
pub type PrimaryKey = i64;

/// Row version used for optimistic concurrency
pub type Version = i64;

/// Request op codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum OpCode {
    Insert = 1,
    Update = 2,
    Drop = 3,
    Get = 4,
    Scan = 5,
    Exit = 6,
}

impl OpCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_wire(code: i32) -> Option<Self> {
        Some(match code {
            1 => OpCode::Insert,
            2 => OpCode::Update,
            3 => OpCode::Drop,
            4 => OpCode::Get,
            5 => OpCode::Scan,
            6 => OpCode::Exit,
            _ => return None,
        })
    }
}

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 1,
    /// id not found
    NotFound = 2,
    /// table not found
    BadTable = 3,
    /// error during scan
    BadQuery = 4,
    /// version check failed
    TxnAbort = 5,
    /// column value type mismatch
    BadValue = 6,
    /// number of values is incorrect
    BadRow = 7,
    /// malformed packet
    BadRequest = 8,
    /// foreign key not found
    BadForeign = 9,
    ServerBusy = 10,
    Unimplemented = 11,
}

impl StatusCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_wire(code: i32) -> Option<Self> {
        Some(match code {
            1 => StatusCode::Ok,
            2 => StatusCode::NotFound,
            3 => StatusCode::BadTable,
            4 => StatusCode::BadQuery,
            5 => StatusCode::TxnAbort,
            6 => StatusCode::BadValue,
            7 => StatusCode::BadRow,
            8 => StatusCode::BadRequest,
            9 => StatusCode::BadForeign,
            10 => StatusCode::ServerBusy,
            11 => StatusCode::Unimplemented,
            _ => return None,
        })
    }

    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::BadTable => "BAD_TABLE",
            StatusCode::BadQuery => "BAD_QUERY",
            StatusCode::TxnAbort => "TXN_ABORT",
            StatusCode::BadValue => "BAD_VALUE",
            StatusCode::BadRow => "BAD_ROW",
            StatusCode::BadRequest => "BAD_REQUEST",
            StatusCode::BadForeign => "BAD_FOREIGN",
            StatusCode::ServerBusy => "SERVER_BUSY",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
        };
        f.write_str(name)
    }
}

/// Value type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum TypeTag {
    Null = 0,
    Integer = 1,
    Float = 2,
    String = 3,
    Foreign = 4,
}

impl TypeTag {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_wire(tag: i32) -> Option<Self> {
        Some(match tag {
            0 => TypeTag::Null,
            1 => TypeTag::Integer,
            2 => TypeTag::Float,
            3 => TypeTag::String,
            4 => TypeTag::Foreign,
            _ => return None,
        })
    }

    /// Payload length for fixed-size tags, `None` for strings
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            TypeTag::Null => Some(0),
            TypeTag::Integer | TypeTag::Float | TypeTag::Foreign => Some(8),
            TypeTag::String => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Null => "null",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::String => "string",
            TypeTag::Foreign => "foreign",
        };
        f.write_str(name)
    }
}

/// Scan operators
///
/// `Le` and `Ge` have wire codes but the reference server does not
/// implement them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Operator {
    /// Every row, no column or value
    All = 1,
    Eq = 2,
    Ne = 3,
    Lt = 4,
    Gt = 5,
    Le = 6,
    Ge = 7,
}

impl Operator {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn from_wire(code: i32) -> Option<Self> {
        Some(match code {
            1 => Operator::All,
            2 => Operator::Eq,
            3 => Operator::Ne,
            4 => Operator::Lt,
            5 => Operator::Gt,
            6 => Operator::Le,
            7 => Operator::Ge,
            _ => return None,
        })
    }
}

impl std::str::FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "al" => Ok(Operator::All),
            "eq" | "=" | "==" => Ok(Operator::Eq),
            "ne" | "!=" => Ok(Operator::Ne),
            "lt" | "<" => Ok(Operator::Lt),
            "gt" | ">" => Ok(Operator::Gt),
            "le" | "<=" => Ok(Operator::Le),
            "ge" | ">=" => Ok(Operator::Ge),
            other => Err(format!("unknown operator: {}", other)),
        }
    }
}
