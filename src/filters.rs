//! Custom askama filters.

pub const CURRENCY: &str = "₹";

/// Indian digit grouping: 1,50,000.
pub fn format_inr(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = amount.abs().round() as u64;
    let digits = rounded.to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (front, back) = rest.split_at(rest.len() - 2);
            groups.push(back);
            rest = front;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    };

    if negative {
        format!("-{CURRENCY}{grouped}")
    } else {
        format!("{CURRENCY}{grouped}")
    }
}

/// Lets filters accept values and references alike.
pub trait Number {
    fn as_f64(&self) -> f64;
}

impl Number for f64 {
    fn as_f64(&self) -> f64 {
        *self
    }
}

impl Number for i64 {
    fn as_f64(&self) -> f64 {
        *self as f64
    }
}

impl<T: Number + ?Sized> Number for &T {
    fn as_f64(&self) -> f64 {
        (**self).as_f64()
    }
}

pub fn money<T: Number>(amount: T) -> askama::Result<String> {
    Ok(format_inr(amount.as_f64()))
}

pub fn stars<T: Number>(rating: T) -> askama::Result<String> {
    let filled = rating.as_f64().clamp(0.0, 5.0) as usize;
    Ok(format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupees_use_lakh_grouping() {
        assert_eq!(format_inr(800.0), "₹800");
        assert_eq!(format_inr(1500.0), "₹1,500");
        assert_eq!(format_inr(150000.0), "₹1,50,000");
        assert_eq!(format_inr(12345678.4), "₹1,23,45,678");
        assert_eq!(format_inr(-2500.0), "-₹2,500");
    }

    #[test]
    fn stars_are_clamped() {
        assert_eq!(stars(4i64).unwrap(), "★★★★☆");
        assert_eq!(stars(&9i64).unwrap(), "★★★★★");
        assert_eq!(money(&&1500.0).unwrap(), "₹1,500");
    }
}
