//! Tests for the Keysight PNA driver.

use std::time::Duration;

use rstest::*;

use gpibrs::{InstrumentError, LoopbackInterface};
use measurements::Frequency;

use keysight_pna::{AveragingWait, Pna, SweepConfig, TraceFormat};

type PnaLbk = Pna<LoopbackInterface>;

/// Function that takes input, output `Vec<&str>` and prepares the PNA instrument with this
/// loopback interface.
fn crt_inst(host2inst: Vec<&str>, inst2host: Vec<&str>) -> PnaLbk {
    let interface = LoopbackInterface::new(host2inst, inst2host, "\n");
    Pna::try_new(interface).unwrap()
}

/// A sweep configuration matching the customary defaults.
#[fixture]
fn config() -> SweepConfig {
    SweepConfig::new(
        Frequency::from_gigahertz(4.5),
        Frequency::from_megahertz(10.0),
    )
}

/// Ensure initialization of the instrument works correctly and exchanges no commands.
#[rstest]
fn test_initialization() {
    let _ = crt_inst(vec![], vec![]);
}

/// Query the identification of the instrument.
#[rstest]
fn test_identity() {
    let mut inst = crt_inst(
        vec!["*IDN?"],
        vec!["Keysight Technologies,N5222A,MY12345678,A.09.90.02"],
    );
    assert_eq!(
        "Keysight Technologies,N5222A,MY12345678,A.09.90.02",
        inst.identity().unwrap()
    );
}

/// Configuring with the measurement trace already in the catalog skips the trace definition
/// and writes the sweep parameters with correctly formatted units.
#[rstest]
fn test_configure_existing_trace(config: SweepConfig) {
    let mut inst = crt_inst(
        vec![
            "CALC:PAR:CAT:EXT?",
            "SENSe1:SWEep:POINts 201",
            "SENSe1:FREQuency:CENTer 4.5GHZ",
            "SENSe1:FREQuency:SPAN 10MHZ",
            "SENSe1:BANDwidth 5KHZ",
            "SENSe1:SWEep:TIME:AUTO ON",
            "SOUR:POW1 -30",
            "CALCulate1:CORRection:EDELay:TIME 40NS",
            "SENSe1:AVERage:STATe ON",
            "SENSe1:AVERage:Count 100",
        ],
        vec!["\"Meas,S21\""],
    );
    inst.configure(&config).unwrap();
}

/// A catalog that does not list the measurement trace triggers a fresh trace definition.
#[rstest]
fn test_configure_defines_missing_trace(config: SweepConfig) {
    let mut inst = crt_inst(
        vec![
            "CALC:PAR:CAT:EXT?",
            "CALCulate1:PARameter:DEFine:EXT 'Meas',S21",
            "DISPlay:WINDow1:STATE ON",
            "DISPlay:WINDow1:TRACe1:FEED 'Meas'",
            "DISPlay:WINDow1:TRACe2:FEED 'Meas'",
            "SENSe1:SWEep:POINts 201",
            "SENSe1:FREQuency:CENTer 4.5GHZ",
            "SENSe1:FREQuency:SPAN 10MHZ",
            "SENSe1:BANDwidth 5KHZ",
            "SENSe1:SWEep:TIME:AUTO ON",
            "SOUR:POW1 -30",
            "CALCulate1:CORRection:EDELay:TIME 40NS",
            "SENSe1:AVERage:STATe ON",
            "SENSe1:AVERage:Count 100",
        ],
        vec!["\"NO CATALOG\""],
    );
    inst.configure(&config).unwrap();
}

/// The average count is floored to an integer and never configured below 1.
#[rstest]
#[case(-5.0, 1)]
#[case(0.0, 1)]
#[case(0.5, 1)]
#[case(5.7, 5)]
#[case(100.0, 100)]
fn test_configure_average_clamping(
    config: SweepConfig,
    #[case] averages: f64,
    #[case] expected: u64,
) {
    let mut config = config;
    config.average_count = averages;
    let mut inst = crt_inst(
        vec![
            "CALC:PAR:CAT:EXT?",
            "SENSe1:SWEep:POINts 201",
            "SENSe1:FREQuency:CENTer 4.5GHZ",
            "SENSe1:FREQuency:SPAN 10MHZ",
            "SENSe1:BANDwidth 5KHZ",
            "SENSe1:SWEep:TIME:AUTO ON",
            "SOUR:POW1 -30",
            "CALCulate1:CORRection:EDELay:TIME 40NS",
            "SENSe1:AVERage:STATe ON",
            &format!("SENSe1:AVERage:Count {expected}"),
        ],
        vec!["\"Meas,S21\""],
    );
    inst.configure(&config).unwrap();
}

/// A zero point count is rejected before anything is sent to the instrument.
#[rstest]
fn test_configure_zero_points(config: SweepConfig) {
    let mut config = config;
    config.point_count = 0;
    let mut inst = crt_inst(vec![], vec![]);
    match inst.configure(&config) {
        Err(InstrumentError::IntValueOutOfRange { value, min, .. }) => {
            assert_eq!(value, 0);
            assert_eq!(min, 1);
        }
        _ => panic!("Expected an out of range error."),
    }
}

/// The acquisition preamble selects the trace, sets ASCII transfers, and enables the output.
#[rstest]
fn test_select_format_output() {
    let mut inst = crt_inst(
        vec![
            "CALCulate1:PARameter:SELect 'Meas'",
            "FORMat ASCII",
            "OUTPut:STATe ON",
        ],
        vec![],
    );
    inst.select_measurement().unwrap();
    inst.set_ascii_format().unwrap();
    inst.enable_output().unwrap();
}

/// The averaging condition register is interpreted as a bitmask.
#[rstest]
#[case("+0", false)]
#[case("+2", true)]
#[case("+6", true)]
fn test_averaging_complete(#[case] response: &str, #[case] expected: bool) {
    let mut inst = crt_inst(vec!["STAT:OPER:AVER1:COND?"], vec![response]);
    assert_eq!(expected, inst.averaging_complete().unwrap());
}

/// A malformed condition register response is a parse error, not an endless wait.
#[rstest]
fn test_averaging_complete_malformed() {
    let mut inst = crt_inst(vec!["STAT:OPER:AVER1:COND?"], vec!["done"]);
    assert!(inst.averaging_complete().is_err());
}

/// The wait polls the condition register until the completion bit is set.
#[rstest]
fn test_wait_for_averaging() {
    let mut inst = crt_inst(
        vec![
            "STAT:OPER:AVER1:COND?",
            "STAT:OPER:AVER1:COND?",
            "STAT:OPER:AVER1:COND?",
        ],
        vec!["+0", "+0", "+2"],
    );
    let wait = AveragingWait {
        poll_interval: Duration::ZERO,
        timeout: None,
    };
    inst.wait_for_averaging(&wait).unwrap();
}

/// With a deadline configured, the wait surfaces a timeout instead of blocking forever.
#[rstest]
fn test_wait_for_averaging_timeout() {
    let mut inst = crt_inst(vec!["STAT:OPER:AVER1:COND?"], vec!["+0"]);
    let wait = AveragingWait {
        poll_interval: Duration::ZERO,
        timeout: Some(Duration::ZERO),
    };
    match inst.wait_for_averaging(&wait) {
        Err(InstrumentError::Timeout(timeout)) => assert_eq!(timeout, Duration::ZERO),
        _ => panic!("Expected a timeout error."),
    }
}

/// Read back a single formatted trace.
#[rstest]
fn test_read_trace() {
    let mut inst = crt_inst(
        vec!["CALCulate1:FORMat PHASe", "CALCulate1:DATA? FDATA"],
        vec!["-1.5E1,2.5,3.0"],
    );
    assert_eq!(
        vec![-15.0, 2.5, 3.0],
        inst.read_trace(TraceFormat::Phase).unwrap()
    );
}

/// A full measurement read interpolates the frequency axis between the reported start and
/// stop frequency and aligns it with the phase and magnitude traces.
#[rstest]
fn test_read_measurement() {
    let mut inst = crt_inst(
        vec![
            "SENSe1:FREQuency:START?",
            "SENSe1:FREQuency:STOP?",
            "CALCulate1:FORMat PHASe",
            "CALCulate1:DATA? FDATA",
            "CALCulate1:FORMat MLOG",
            "CALCulate1:DATA? FDATA",
        ],
        vec![
            "4000000000",
            "5000000000",
            "1.0,2.0,3.0",
            "-10.0,-11.0,-12.0",
        ],
    );
    let trace = inst.read_measurement(3).unwrap();
    assert_eq!(trace.len(), 3);
    assert_eq!(trace.frequencies, vec![4.0e9, 4.5e9, 5.0e9]);
    assert_eq!(trace.magnitude, vec![-10.0, -11.0, -12.0]);
    assert_eq!(trace.phase, vec![1.0, 2.0, 3.0]);

    // The frequency axis follows the sweep direction monotonically.
    assert!(trace.frequencies.windows(2).all(|w| w[0] <= w[1]));
}

/// A trace of the wrong length is rejected.
#[rstest]
fn test_read_measurement_length_mismatch() {
    let mut inst = crt_inst(
        vec![
            "SENSe1:FREQuency:START?",
            "SENSe1:FREQuency:STOP?",
            "CALCulate1:FORMat PHASe",
            "CALCulate1:DATA? FDATA",
            "CALCulate1:FORMat MLOG",
            "CALCulate1:DATA? FDATA",
        ],
        vec!["4000000000", "5000000000", "1.0,2.0,3.0", "-10.0,-11.0"],
    );
    match inst.read_measurement(3) {
        Err(InstrumentError::InstrumentStatus(msg)) => {
            assert!(msg.contains("Trace length mismatch"));
        }
        _ => panic!("Expected a trace length mismatch error."),
    }
}
