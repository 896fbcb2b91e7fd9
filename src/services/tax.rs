//! Statutory deduction calculator.
//!
//! Pure functions over `rust_decimal::Decimal`; no storage access, no
//! floating point. Every computed field is rounded exactly once, to two
//! places, midpoint away from zero (standard currency rounding).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::errors::ServiceError;

/// Ghana PAYE brackets over *annual* income in GHS: (bracket width, rate %).
/// The final bracket is unbounded; anything above the finite widths is
/// taxed at the top rate.
const ANNUAL_TAX_BRACKETS: [(Decimal, Decimal); 5] = [
    (dec!(4380), dec!(0)),
    (dec!(1320), dec!(5)),
    (dec!(1320), dec!(10)),
    (dec!(33120), dec!(17.5)),
    (dec!(199860), dec!(25)),
];

/// Rate applied to annual income beyond all finite brackets.
const TOP_RATE: Decimal = dec!(30);

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn require_non_negative(name: &str, amount: Decimal) -> Result<(), ServiceError> {
    if amount.is_sign_negative() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative, got {}",
            name, amount
        )));
    }
    Ok(())
}

/// SSNIT contribution: `gross * rate / 100`, rounded once.
pub fn calculate_ssnit(gross_salary: Decimal, rate: Decimal) -> Result<Decimal, ServiceError> {
    require_non_negative("gross salary", gross_salary)?;
    require_non_negative("SSNIT rate", rate)?;
    Ok(round_currency(gross_salary * rate / HUNDRED))
}

/// Tier 2 pension contribution: same formula as SSNIT, its own rate.
pub fn calculate_tier2(gross_salary: Decimal, rate: Decimal) -> Result<Decimal, ServiceError> {
    require_non_negative("gross salary", gross_salary)?;
    require_non_negative("Tier 2 rate", rate)?;
    Ok(round_currency(gross_salary * rate / HUNDRED))
}

/// Progressive monthly income tax (PAYE).
///
/// Annualizes the monthly gross, walks the brackets cumulatively (each
/// bracket taxes only the slice of income within its width), taxes any
/// remainder at the top rate, then divides back to a monthly figure and
/// rounds once.
pub fn calculate_income_tax(monthly_gross: Decimal) -> Result<Decimal, ServiceError> {
    require_non_negative("gross salary", monthly_gross)?;

    let annual_gross = monthly_gross * MONTHS_PER_YEAR;

    let mut total_tax = Decimal::ZERO;
    let mut remaining = annual_gross;

    for (width, rate) in ANNUAL_TAX_BRACKETS {
        if remaining <= Decimal::ZERO {
            break;
        }
        let taxable = remaining.min(width);
        total_tax += taxable * rate / HUNDRED;
        remaining -= taxable;
    }

    if remaining > Decimal::ZERO {
        total_tax += remaining * TOP_RATE / HUNDRED;
    }

    Ok(round_currency(total_tax / MONTHS_PER_YEAR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(dec!(920.00), dec!(5.5), dec!(50.60); "standard ssnit rate")]
    #[test_case(dec!(920.00), dec!(3.5), dec!(32.20); "standard tier2 rate")]
    #[test_case(dec!(0), dec!(5.5), dec!(0.00); "zero gross")]
    #[test_case(dec!(1000), dec!(0), dec!(0.00); "zero rate")]
    #[test_case(dec!(333.33), dec!(5.5), dec!(18.33); "rounding down")]
    #[test_case(dec!(100.10), dec!(5.5), dec!(5.51); "midpoint rounds away from zero")]
    fn percentage_deductions(gross: Decimal, rate: Decimal, expected: Decimal) {
        assert_eq!(calculate_ssnit(gross, rate).unwrap(), expected);
        assert_eq!(calculate_tier2(gross, rate).unwrap(), expected);
    }

    #[test]
    fn negative_inputs_are_rejected() {
        assert!(calculate_ssnit(dec!(-1), dec!(5.5)).is_err());
        assert!(calculate_ssnit(dec!(100), dec!(-5.5)).is_err());
        assert!(calculate_tier2(dec!(-1), dec!(3.5)).is_err());
        assert!(calculate_income_tax(dec!(-0.01)).is_err());
    }

    #[test]
    fn income_below_the_free_band_pays_nothing() {
        // 4,380/yr tax-free band => 365/mo
        assert_eq!(calculate_income_tax(dec!(0)).unwrap(), dec!(0.00));
        assert_eq!(calculate_income_tax(dec!(365)).unwrap(), dec!(0.00));
    }

    #[test]
    fn worked_example_920_monthly() {
        // Annual 11,040: 4,380@0 + 1,320@5 (66) + 1,320@10 (132)
        // + remaining 4,020@17.5 (703.50) = 901.50/yr => 75.13/mo
        assert_eq!(calculate_income_tax(dec!(920.00)).unwrap(), dec!(75.13));
    }

    #[test]
    fn exactly_exhausting_a_bracket_boundary() {
        // 7,020/yr = 585/mo sits exactly at the end of the 10% band:
        // 66 + 132 = 198/yr => 16.50/mo
        assert_eq!(calculate_income_tax(dec!(585)).unwrap(), dec!(16.50));
    }

    #[test]
    fn top_rate_applies_beyond_all_brackets() {
        // 20,000/mo = 240,000/yr exhausts every finite bracket exactly:
        // 0 + 66 + 132 + 5,796 + 49,965 = 55,959/yr => 4,663.25/mo
        assert_eq!(calculate_income_tax(dec!(20000)).unwrap(), dec!(4663.25));

        // One extra annual GHS 1,200 (100/mo) above that is taxed at 30%:
        // 55,959 + 360 = 56,319/yr => 4,693.25/mo
        assert_eq!(calculate_income_tax(dec!(20100)).unwrap(), dec!(4693.25));
    }

    #[test]
    fn income_tax_is_monotonic() {
        let mut previous = Decimal::ZERO;
        for gross in [
            dec!(0),
            dec!(100),
            dec!(365),
            dec!(400),
            dec!(585),
            dec!(920),
            dec!(3325),
            dec!(5000),
            dec!(20000),
            dec!(50000),
        ] {
            let tax = calculate_income_tax(gross).unwrap();
            assert!(
                tax >= previous,
                "tax regressed at gross {}: {} < {}",
                gross,
                tax,
                previous
            );
            previous = tax;
        }
    }
}
