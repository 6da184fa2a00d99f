use clap::ValueEnum;

use crate::error::{InstrumentError, Result};

/// One of the three trace buffers on the instrument.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Trace {
    #[value(name = "1")]
    Tr1,
    #[value(name = "2")]
    Tr2,
    #[value(name = "3")]
    Tr3,
}

impl Trace {
    pub fn number(self) -> u8 {
        match self {
            Trace::Tr1 => 1,
            Trace::Tr2 => 2,
            Trace::Tr3 => 3,
        }
    }

    /// The label form used by `:TRACe:DATA?` and `:MMEMory:STORe:TRACe`.
    pub fn label(self) -> &'static str {
        match self {
            Trace::Tr1 => "TRACE1",
            Trace::Tr2 => "TRACE2",
            Trace::Tr3 => "TRACE3",
        }
    }

    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Trace::Tr1),
            2 => Ok(Trace::Tr2),
            3 => Ok(Trace::Tr3),
            other => Err(InstrumentError::InvalidEnum {
                parameter: "trace number",
                value: other.to_string(),
                allowed: "1, 2, 3",
            }),
        }
    }
}

/// Trace processing mode per the `:TRACe<n>:MODE` command.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TraceMode {
    Write,
    MaxHold,
    MinHold,
    View,
    Blank,
    VideoAverage,
    PowerAverage,
}

impl TraceMode {
    pub fn as_scpi(self) -> &'static str {
        match self {
            TraceMode::Write => "WRITe",
            TraceMode::MaxHold => "MAXHold",
            TraceMode::MinHold => "MINHold",
            TraceMode::View => "VIEW",
            TraceMode::Blank => "BLANk",
            TraceMode::VideoAverage => "VIDeoavg",
            TraceMode::PowerAverage => "POWeravg",
        }
    }

    /// Parse a readback. The instrument may answer with either the short or
    /// the full mnemonic form.
    pub fn from_scpi(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "WRIT" | "WRITE" => Ok(TraceMode::Write),
            "MAXH" | "MAXHOLD" => Ok(TraceMode::MaxHold),
            "MINH" | "MINHOLD" => Ok(TraceMode::MinHold),
            "VIEW" => Ok(TraceMode::View),
            "BLAN" | "BLANK" => Ok(TraceMode::Blank),
            "VID" | "VIDEOAVG" => Ok(TraceMode::VideoAverage),
            "POW" | "POWERAVG" => Ok(TraceMode::PowerAverage),
            other => Err(InstrumentError::InvalidEnum {
                parameter: "trace mode",
                value: other.to_string(),
                allowed: "WRITe, MAXHold, MINHold, VIEW, BLANk, VIDeoavg, POWeravg",
            }),
        }
    }
}

/// Wire format for trace data per `:FORMat:TRACe:DATA`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DataFormat {
    Ascii,
    Real32,
}

impl DataFormat {
    pub fn as_scpi(self) -> &'static str {
        match self {
            DataFormat::Ascii => "ASCii",
            DataFormat::Real32 => "REAL,32",
        }
    }

    pub fn from_scpi(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "ASC" | "ASCII" => Ok(DataFormat::Ascii),
            "REAL" | "REAL,32" => Ok(DataFormat::Real32),
            other => Err(InstrumentError::InvalidEnum {
                parameter: "data format",
                value: other.to_string(),
                allowed: "ASCii, REAL,32",
            }),
        }
    }
}

/// Target selector for `:MMEMory:STORe:TRACe`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TraceLabel {
    #[value(name = "TRACE1")]
    Trace1,
    #[value(name = "TRACE2")]
    Trace2,
    #[value(name = "TRACE3")]
    Trace3,
    Math,
    All,
}

impl TraceLabel {
    pub fn as_scpi(self) -> &'static str {
        match self {
            TraceLabel::Trace1 => "TRACE1",
            TraceLabel::Trace2 => "TRACE2",
            TraceLabel::Trace3 => "TRACE3",
            TraceLabel::Math => "MATH",
            TraceLabel::All => "ALL",
        }
    }

    pub fn from_scpi(value: &str) -> Result<Self> {
        match value.trim().to_uppercase().as_str() {
            "TRACE1" => Ok(TraceLabel::Trace1),
            "TRACE2" => Ok(TraceLabel::Trace2),
            "TRACE3" => Ok(TraceLabel::Trace3),
            "MATH" => Ok(TraceLabel::Math),
            "ALL" => Ok(TraceLabel::All),
            other => Err(InstrumentError::InvalidEnum {
                parameter: "trace label",
                value: other.to_string(),
                allowed: "TRACE1, TRACE2, TRACE3, MATH, ALL",
            }),
        }
    }
}
