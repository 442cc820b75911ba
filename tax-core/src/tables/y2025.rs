use rust_decimal_macros::dec;

use super::y2024::federal_schedule;
use super::{
    AmtParameters, ContributionLimits, CreditParameters, DeductionLimits, EducationCreditParameters,
    EitcRow, EitcTable, FilingThresholds, NiitParameters, PerStatus, TaxYearTables, states,
};
use crate::models::{BracketError, TaxYearConfig};

pub(super) fn tables() -> Result<TaxYearTables, BracketError> {
    let joint = federal_schedule([
        dec!(23850),
        dec!(96950),
        dec!(206700),
        dec!(394600),
        dec!(501050),
        dec!(751600),
    ])?;

    Ok(TaxYearTables {
        config: TaxYearConfig {
            tax_year: 2025,
            ss_wage_max: dec!(176100),
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
                dec!(11925),
                dec!(48475),
                dec!(103350),
                dec!(197300),
                dec!(250525),
                dec!(626350),
            ])?,
            married_filing_jointly: joint.clone(),
            married_filing_separately: federal_schedule([
                dec!(11925),
                dec!(48475),
                dec!(103350),
                dec!(197300),
                dec!(250525),
                dec!(375800),
            ])?,
            head_of_household: federal_schedule([
                dec!(17000),
                dec!(64850),
                dec!(103350),
                dec!(197300),
                dec!(250500),
                dec!(626350),
            ])?,
            qualifying_widow: joint,
        },
        standard_deduction: PerStatus {
            single: dec!(15000),
            married_filing_jointly: dec!(30000),
            married_filing_separately: dec!(15000),
            head_of_household: dec!(22500),
            qualifying_widow: dec!(30000),
        },
        amt: AmtParameters {
            exemption: PerStatus {
                single: dec!(88100),
                married_filing_jointly: dec!(137000),
                married_filing_separately: dec!(68500),
                head_of_household: dec!(88100),
                qualifying_widow: dec!(137000),
            },
            phase_out_threshold: PerStatus {
                single: dec!(626350),
                married_filing_jointly: dec!(1252700),
                married_filing_separately: dec!(626350),
                head_of_household: dec!(626350),
                qualifying_widow: dec!(1252700),
            },
            phase_out_rate: dec!(0.25),
            rate_threshold: dec!(239100),
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
            hsa_self_only: dec!(4300),
            hsa_family: dec!(8550),
            hsa_catch_up: dec!(1000),
            hsa_catch_up_age: 55,
            elective_deferral: dec!(23500),
            elective_catch_up: dec!(7500),
            elective_catch_up_age: 50,
        },
        credits: CreditParameters {
            ctc_per_child: dec!(2000),
            ctc_phase_out_threshold: PerStatus::joint_or(dec!(400000), dec!(200000)),
            ctc_reduction_per_step: dec!(50),
            ctc_phase_out_step: dec!(1000),
            eitc: EitcTable {
                investment_income_limit: dec!(11950),
                rows: vec![
                    EitcRow {
                        qualifying_children: 0,
                        max_credit: dec!(649),
                        agi_limit: dec!(19104),
                        agi_limit_joint: dec!(26214),
                    },
                    EitcRow {
                        qualifying_children: 1,
                        max_credit: dec!(4328),
                        agi_limit: dec!(50434),
                        agi_limit_joint: dec!(57554),
                    },
                    EitcRow {
                        qualifying_children: 2,
                        max_credit: dec!(7152),
                        agi_limit: dec!(57310),
                        agi_limit_joint: dec!(64430),
                    },
                    EitcRow {
                        qualifying_children: 3,
                        max_credit: dec!(8046),
                        agi_limit: dec!(61555),
                        agi_limit_joint: dec!(68675),
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
                single: dec!(15000),
                married_filing_jointly: dec!(30000),
                married_filing_separately: dec!(5),
                head_of_household: dec!(22500),
                qualifying_widow: dec!(30000),
            },
            additional_per_senior: PerStatus {
                single: dec!(2000),
                married_filing_jointly: dec!(1600),
                married_filing_separately: dec!(0),
                head_of_household: dec!(2000),
                qualifying_widow: dec!(1600),
            },
            senior_age: 65,
        },
        states: states::states_2025()?,
    })
}
