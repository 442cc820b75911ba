use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::StateSchedule;
use crate::models::{BracketError, BracketSchedule};

const NO_INCOME_TAX: [&str; 9] = ["AK", "FL", "NH", "NV", "SD", "TN", "TX", "WA", "WY"];

fn flat(rate: Decimal) -> StateSchedule {
    StateSchedule::Flat { rate }
}

fn california() -> Result<StateSchedule, BracketError> {
    let single = BracketSchedule::from_thresholds(
        &[
            (dec!(10756), dec!(0.01)),
            (dec!(25499), dec!(0.02)),
            (dec!(40245), dec!(0.04)),
            (dec!(55866), dec!(0.06)),
            (dec!(70606), dec!(0.08)),
            (dec!(360659), dec!(0.093)),
            (dec!(432787), dec!(0.103)),
            (dec!(721314), dec!(0.113)),
        ],
        dec!(0.123),
    )?;
    let joint = BracketSchedule::from_thresholds(
        &[
            (dec!(21512), dec!(0.01)),
            (dec!(50998), dec!(0.02)),
            (dec!(80490), dec!(0.04)),
            (dec!(111732), dec!(0.06)),
            (dec!(141212), dec!(0.08)),
            (dec!(721318), dec!(0.093)),
            (dec!(865574), dec!(0.103)),
            (dec!(1442628), dec!(0.113)),
        ],
        dec!(0.123),
    )?;
    Ok(StateSchedule::Progressive {
        single,
        joint: Some(joint),
    })
}

fn new_york() -> Result<StateSchedule, BracketError> {
    let single = BracketSchedule::from_thresholds(
        &[
            (dec!(8500), dec!(0.04)),
            (dec!(11700), dec!(0.045)),
            (dec!(13900), dec!(0.0525)),
            (dec!(80650), dec!(0.055)),
            (dec!(215400), dec!(0.06)),
            (dec!(1077550), dec!(0.0685)),
            (dec!(5000000), dec!(0.0965)),
            (dec!(25000000), dec!(0.103)),
        ],
        dec!(0.109),
    )?;
    let joint = BracketSchedule::from_thresholds(
        &[
            (dec!(17150), dec!(0.04)),
            (dec!(23600), dec!(0.045)),
            (dec!(27900), dec!(0.0525)),
            (dec!(161550), dec!(0.055)),
            (dec!(323200), dec!(0.06)),
            (dec!(2155350), dec!(0.0685)),
            (dec!(5000000), dec!(0.0965)),
            (dec!(25000000), dec!(0.103)),
        ],
        dec!(0.109),
    )?;
    Ok(StateSchedule::Progressive {
        single,
        joint: Some(joint),
    })
}

fn oregon() -> Result<StateSchedule, BracketError> {
    let single = BracketSchedule::from_thresholds(
        &[
            (dec!(4300), dec!(0.0475)),
            (dec!(10750), dec!(0.0675)),
            (dec!(125000), dec!(0.0875)),
        ],
        dec!(0.099),
    )?;
    let joint = BracketSchedule::from_thresholds(
        &[
            (dec!(8600), dec!(0.0475)),
            (dec!(21500), dec!(0.0675)),
            (dec!(250000), dec!(0.0875)),
        ],
        dec!(0.099),
    )?;
    Ok(StateSchedule::Progressive {
        single,
        joint: Some(joint),
    })
}

pub(super) fn states_2024() -> Result<BTreeMap<String, StateSchedule>, BracketError> {
    let mut states: BTreeMap<String, StateSchedule> = NO_INCOME_TAX
        .iter()
        .map(|code| (code.to_string(), StateSchedule::NoIncomeTax))
        .collect();

    for (code, rate) in [
        ("AZ", dec!(0.025)),
        ("CO", dec!(0.0425)),
        ("GA", dec!(0.0539)),
        ("IL", dec!(0.0495)),
        ("IN", dec!(0.0305)),
        ("KY", dec!(0.04)),
        ("MA", dec!(0.05)),
        ("MI", dec!(0.0425)),
        ("NC", dec!(0.045)),
        ("PA", dec!(0.0307)),
        ("UT", dec!(0.0455)),
    ] {
        states.insert(code.to_string(), flat(rate));
    }

    states.insert("CA".to_string(), california()?);
    states.insert("NY".to_string(), new_york()?);
    states.insert("OR".to_string(), oregon()?);
    Ok(states)
}

/// 2025 reuses the 2024 progressive schedules; only the flat-rate states
/// that cut rates change.
pub(super) fn states_2025() -> Result<BTreeMap<String, StateSchedule>, BracketError> {
    let mut states = states_2024()?;
    for (code, rate) in [
        ("CO", dec!(0.044)),
        ("GA", dec!(0.0519)),
        ("IN", dec!(0.03)),
        ("NC", dec!(0.0425)),
        ("UT", dec!(0.045)),
    ] {
        states.insert(code.to_string(), flat(rate));
    }
    Ok(states)
}
