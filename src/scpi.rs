//! SCPI command construction for the DSA815 command tree.
//!
//! Every command string the crate sends is produced here, from the static
//! stem table in [`cmd`] plus the small formatters below. Call sites never
//! concatenate protocol text themselves, which keeps the wire surface
//! auditable in one place.

use std::fmt::Display;

use crate::types::{Trace, TraceLabel};

/// Command stems, one per instrument capability.
pub mod cmd {
    pub const IDENTIFY: &str = "*IDN";
    pub const TG_STATE: &str = ":OUTput:STATe";
    pub const TG_AMPLITUDE: &str = ":SOURce:POWer:LEVel:IMMediate:AMPLitude";
    pub const FREQ_START: &str = ":SENSe:FREQuency:STARt";
    pub const FREQ_STOP: &str = ":SENSe:FREQuency:STOP";
    pub const FREQ_CENTER: &str = ":SENSe:FREQuency:CENTer";
    pub const FREQ_SPAN: &str = ":SENSe:FREQuency:SPAN";
    pub const RBW: &str = ":SENSe:BANDwidth:RESolution";
    pub const VBW: &str = ":SENSe:BANDwidth:VIDeo";
    pub const PREAMP_STATE: &str = ":SENSe:POWer:RF:GAIN:STATe";
    pub const ATTENUATION: &str = ":SENSe:POWer:RF:ATTenuation";
    pub const INITIATE_CONTINUOUS: &str = ":INITiate:CONTinuous";
    pub const INITIATE: &str = ":INITiate:IMMediate";
    pub const OPERATION_CONDITION: &str = ":STATus:OPERation:CONDition";
    pub const SWEEP_TIME: &str = ":SENSe:SWEep:TIME";
    pub const SWEEP_COUNT: &str = ":SENSe:SWEep:COUNt";
    pub const SWEEP_POINTS: &str = ":SENSe:SWEep:POINts";
    pub const TRACE_FORMAT: &str = ":FORMat:TRACe:DATA";
    pub const TRACE_DATA: &str = ":TRACe:DATA";
    pub const FILE_DELETE: &str = ":MMEMory:DELete";
    pub const DISK_INFO: &str = ":MMEMory:DISK:INFormation";
    pub const LOAD_SETUP: &str = ":MMEMory:LOAD:SETUp";
    pub const LOAD_STATE: &str = ":MMEMory:LOAD:STATe";
    pub const LOAD_TRACE: &str = ":MMEMory:LOAD:TRACe";
    pub const STORE_RESULTS: &str = ":MMEMory:STORe:RESults";
    pub const STORE_TRACE: &str = ":MMEMory:STORe:TRACe";
    pub const STORE_SCREEN: &str = ":MMEMory:STORe:SCReen";
    pub const STORE_SETUP: &str = ":MMEMory:STORe:SETUp";
    pub const STORE_STATE: &str = ":MMEMory:STORe:STATe";
}

/// Format a set command: stem plus one space-separated argument.
pub fn set(stem: &str, value: impl Display) -> String {
    format!("{stem} {value}")
}

/// Format a readback query: stem plus `?`.
pub fn query(stem: &str) -> String {
    format!("{stem}?")
}

/// `:TRACe<n>:MODE` stem for one of the three traces.
pub fn trace_mode_stem(trace: Trace) -> String {
    format!(":TRACe{}:MODE", trace.number())
}

/// Query the raw payload of one trace buffer.
pub fn trace_data_query(label: TraceLabel) -> String {
    format!("{}? {}", cmd::TRACE_DATA, label.as_scpi())
}

/// Store a trace buffer to a file on the instrument.
pub fn store_trace(label: TraceLabel, path: &str) -> String {
    format!("{} {},{}", cmd::STORE_TRACE, label.as_scpi(), path)
}

/// Store the instrument state; register 1 is the only register this
/// instrument exposes through MMEMory.
pub fn store_state(path: &str) -> String {
    format!("{} 1,{}", cmd::STORE_STATE, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_query_forms() {
        assert_eq!(set(cmd::FREQ_CENTER, 80e6), ":SENSe:FREQuency:CENTer 80000000");
        assert_eq!(set(cmd::TG_AMPLITUDE, -10.5), ":SOURce:POWer:LEVel:IMMediate:AMPLitude -10.5");
        assert_eq!(query(cmd::FREQ_CENTER), ":SENSe:FREQuency:CENTer?");
        assert_eq!(query(cmd::OPERATION_CONDITION), ":STATus:OPERation:CONDition?");
    }

    #[test]
    fn trace_commands() {
        assert_eq!(trace_mode_stem(Trace::Tr2), ":TRACe2:MODE");
        assert_eq!(set(&trace_mode_stem(Trace::Tr1), "WRITe"), ":TRACe1:MODE WRITe");
        assert_eq!(trace_data_query(TraceLabel::Trace1), ":TRACe:DATA? TRACE1");
    }

    #[test]
    fn file_commands() {
        assert_eq!(
            store_trace(TraceLabel::All, "D:\\Trace1.trc"),
            ":MMEMory:STORe:TRACe ALL,D:\\Trace1.trc"
        );
        assert_eq!(store_state("D:\\state.sta"), ":MMEMory:STORe:STATe 1,D:\\state.sta");
        assert_eq!(set(cmd::FILE_DELETE, "E:\\old.trc"), ":MMEMory:DELete E:\\old.trc");
    }
}
