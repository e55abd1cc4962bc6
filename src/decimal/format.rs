use super::Decimal;

/// Magnitude suffixes, one per power of one thousand.
pub const SUFFIXES: [&str; 22] = [
    "", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc", "UDc", "DDc", "TDc", "QaDc",
    "QiDc", "SxDc", "SpDc", "OcDc", "NoDc", "Vg",
];

impl Decimal {
    /// `1.50K`, `12.00B`; falls back to scientific past the suffix table.
    pub fn format_human(&self, precision: usize) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        if self.is_negative() {
            return format!("-{}", self.abs().format_human(precision));
        }
        let (mantissa, exponent) = self.parts();
        if exponent < 3 {
            let plain = self.to_f64();
            if round_to(plain, precision) < 1000.0 {
                return format!("{:.*}", precision, plain);
            }
            return format!("{:.*}{}", precision, plain / 1000.0, SUFFIXES[1]);
        }
        let mut tier = (exponent / 3) as usize;
        let mut scaled = mantissa * 10f64.powi((exponent % 3) as i32);
        if round_to(scaled, precision) >= 1000.0 {
            scaled /= 1000.0;
            tier += 1;
        }
        match SUFFIXES.get(tier) {
            Some(suffix) => format!("{:.*}{}", precision, scaled, suffix),
            None => self.format_scientific(precision),
        }
    }

    /// `1.23e45`.
    pub fn format_scientific(&self, precision: usize) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let (mut mantissa, mut exponent) = self.parts();
        if round_to(mantissa.abs(), precision) >= 10.0 {
            mantissa /= 10.0;
            exponent = exponent.saturating_add(1);
        }
        format!("{:.*}e{}", precision, mantissa, exponent)
    }

    /// `0.25` formats as `25%` at precision 0.
    pub fn format_percent(&self, precision: usize) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let percent = *self * Decimal::from(100_u32);
        let (_, exponent) = percent.parts();
        if exponent >= 15 {
            return format!("{}%", percent.format_scientific(precision));
        }
        format!("{:.*}%", precision, percent.to_f64())
    }
}

fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision.min(15) as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use crate::Decimal;

    fn d(text: &str) -> Decimal {
        text.parse().expect("valid decimal literal")
    }

    #[test]
    fn zero_has_no_suffix() {
        assert_eq!(Decimal::ZERO.format_human(2), "0");
        assert_eq!(Decimal::ZERO.format_scientific(2), "0");
        assert_eq!(Decimal::ZERO.format_percent(1), "0");
    }

    #[test]
    fn human_format_uses_suffix_table() {
        assert_eq!(d("999").format_human(0), "999");
        assert_eq!(d("12.345").format_human(1), "12.3");
        assert_eq!(d("1500").format_human(2), "1.50K");
        assert_eq!(d("2.5e6").format_human(1), "2.5M");
        assert_eq!(d("7e9").format_human(0), "7B");
        assert_eq!(d("1e12").format_human(2), "1.00T");
        assert_eq!(d("1e63").format_human(1), "1.0Vg");
        assert_eq!(d("-1500").format_human(1), "-1.5K");
    }

    #[test]
    fn human_format_rolls_over_rounded_tiers() {
        assert_eq!(d("999999").format_human(2), "1.00M");
        assert_eq!(d("999.999").format_human(2), "1.00K");
        assert_eq!(d("999.4").format_human(0), "999");
    }

    #[test]
    fn past_the_table_falls_back_to_scientific() {
        assert_eq!(d("1e66").format_human(2), "1.00e66");
        assert_eq!(d("4.2e1000").format_human(1), "4.2e1000");
    }

    #[test]
    fn extreme_exponents_format_without_overflow() {
        let top = d("9.9999e9223372036854775807");
        assert_eq!(top.format_scientific(2), "1.00e9223372036854775807");
        assert_eq!(top.format_human(2), "1.00e9223372036854775807");
        assert_eq!(d("1e-9223372036854775808").format_scientific(1), "1.0e-9223372036854775808");
    }

    #[test]
    fn scientific_and_percent_forms() {
        assert_eq!(d("123456").format_scientific(2), "1.23e5");
        assert_eq!(d("9.999e10").format_scientific(2), "1.00e11");
        assert_eq!(d("0.25").format_percent(0), "25%");
        assert_eq!(d("0.125").format_percent(1), "12.5%");
    }
}
