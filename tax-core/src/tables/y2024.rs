use rust_decimal_macros::dec;

use super::{
    AmtParameters, ContributionLimits, CreditParameters, DeductionLimits, EducationCreditParameters,
    EitcRow, EitcTable, FilingThresholds, NiitParameters, PerStatus, TaxYearTables, states,
};
use crate::models::{BracketError, BracketSchedule, TaxYearConfig};

const RATES: [rust_decimal::Decimal; 6] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
];

/// Federal schedule from the six bracket ceilings; income above the last
/// ceiling is taxed at 37%.
pub(super) fn federal_schedule(
    ceilings: [rust_decimal::Decimal; 6]
) -> Result<BracketSchedule, BracketError> {
    let thresholds: Vec<_> = ceilings.into_iter().zip(RATES).collect();
    BracketSchedule::from_thresholds(&thresholds, dec!(0.37))
}

pub(super) fn tables() -> Result<TaxYearTables, BracketError> {
    let joint = federal_schedule([
        dec!(23200),
        dec!(94300),
        dec!(201050),
        dec!(383900),
        dec!(487450),
        dec!(731200),
    ])?;

    Ok(TaxYearTables {
        config: TaxYearConfig {
            tax_year: 2024,
            ss_wage_max: dec!(168600),
            ss_tax_rate: dec!(0.124),
            medicare_tax_rate: dec!(0.029),
            additional_medicare_rate: dec!(0.009),
            additional_medicare_threshold: dec!(200000),
            se_tax_deductible_percentage: dec!(0.9235),
            se_deduction_factor: dec!(0.50),
            min_se_threshold: dec!(400),
        },
        brackets: PerStatus {
            single: federal_schedule([
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(609350),
            ])?,
            married_filing_jointly: joint.clone(),
            married_filing_separately: federal_schedule([
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(365600),
            ])?,
            head_of_household: federal_schedule([
                dec!(16550),
                dec!(63100),
                dec!(100500),
                dec!(191950),
                dec!(243700),
                dec!(609350),
            ])?,
            qualifying_widow: joint,
        },
        standard_deduction: PerStatus {
            single: dec!(14600),
            married_filing_jointly: dec!(29200),
            married_filing_separately: dec!(14600),
            head_of_household: dec!(21900),
            qualifying_widow: dec!(29200),
        },
        amt: AmtParameters {
            exemption: PerStatus {
                single: dec!(85700),
                married_filing_jointly: dec!(133300),
                married_filing_separately: dec!(66650),
                head_of_household: dec!(85700),
                qualifying_widow: dec!(133300),
            },
            phase_out_threshold: PerStatus {
                single: dec!(609350),
                married_filing_jointly: dec!(1218700),
                married_filing_separately: dec!(609350),
                head_of_household: dec!(609350),
                qualifying_widow: dec!(1218700),
            },
            phase_out_rate: dec!(0.25),
            rate_threshold: dec!(232600),
            low_rate: dec!(0.26),
            high_rate: dec!(0.28),
        },
        niit: NiitParameters {
            threshold: PerStatus {
                single: dec!(200000),
                married_filing_jointly: dec!(250000),
                married_filing_separately: dec!(125000),
                head_of_household: dec!(200000),
                qualifying_widow: dec!(250000),
            },
            rate: dec!(0.038),
        },
        deduction_limits: DeductionLimits {
            salt_cap: dec!(10000),
            salt_cap_married_separately: dec!(5000),
            charitable_cash_agi_limit: dec!(0.60),
            medical_agi_floor: dec!(0.075),
            student_loan_interest_cap: dec!(2500),
        },
        contribution_limits: ContributionLimits {
            ira_base: dec!(7000),
            ira_catch_up: dec!(1000),
            ira_catch_up_age: 50,
            hsa_self_only: dec!(4150),
            hsa_family: dec!(8300),
            hsa_catch_up: dec!(1000),
            hsa_catch_up_age: 55,
            elective_deferral: dec!(23000),
            elective_catch_up: dec!(7500),
            elective_catch_up_age: 50,
        },
        credits: CreditParameters {
            ctc_per_child: dec!(2000),
            ctc_phase_out_threshold: PerStatus::joint_or(dec!(400000), dec!(200000)),
            ctc_reduction_per_step: dec!(50),
            ctc_phase_out_step: dec!(1000),
            eitc: EitcTable {
                investment_income_limit: dec!(11600),
                rows: vec![
                    EitcRow {
                        qualifying_children: 0,
                        max_credit: dec!(632),
                        agi_limit: dec!(18591),
                        agi_limit_joint: dec!(25511),
                    },
                    EitcRow {
                        qualifying_children: 1,
                        max_credit: dec!(4213),
                        agi_limit: dec!(49084),
                        agi_limit_joint: dec!(56004),
                    },
                    EitcRow {
                        qualifying_children: 2,
                        max_credit: dec!(6960),
                        agi_limit: dec!(55768),
                        agi_limit_joint: dec!(62688),
                    },
                    EitcRow {
                        qualifying_children: 3,
                        max_credit: dec!(7830),
                        agi_limit: dec!(59899),
                        agi_limit_joint: dec!(66819),
                    },
                ],
            },
            education: EducationCreditParameters {
                aotc_max_per_student: dec!(2500),
                llc_max: dec!(2000),
                phase_out_start: dec!(80000),
                phase_out_end: dec!(90000),
                phase_out_start_joint: dec!(160000),
                phase_out_end_joint: dec!(180000),
            },
        },
        filing_thresholds: FilingThresholds {
            base: PerStatus {
                single: dec!(14600),
                married_filing_jointly: dec!(29200),
                married_filing_separately: dec!(5),
                head_of_household: dec!(21900),
                qualifying_widow: dec!(29200),
            },
            additional_per_senior: PerStatus {
                single: dec!(1950),
                married_filing_jointly: dec!(1550),
                married_filing_separately: dec!(0),
                head_of_household: dec!(1950),
                qualifying_widow: dec!(1550),
            },
            senior_age: 65,
        },
        states: states::states_2024()?,
    })
}
