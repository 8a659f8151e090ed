/// English ordinal suffix for `n`.
///
/// 4 through 20 always take `th`; everything else follows its last digit, so
/// 111 reads `111st`.
#[must_use]
pub fn ordinal_suffix(n: u32) -> &'static str {
    if n > 3 && n < 21 {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Title for the imbalance zone keyed by `candle_index`.
///
/// Index 1 is the indecision candle itself; index `n > 1` is the `(n-1)`-th
/// candle preceding it.
#[must_use]
pub fn candle_slot_label(candle_index: u32) -> String {
    if candle_index <= 1 {
        return "Indecision Candle".to_owned();
    }
    let preceding = candle_index - 1;
    format!("{preceding}{} Preceding Candle", ordinal_suffix(preceding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_suffix_follows_last_digit_outside_teens() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(20), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(111), "st");
    }

    #[test]
    fn candle_slot_label_names_indecision_and_preceding_candles() {
        assert_eq!(candle_slot_label(1), "Indecision Candle");
        assert_eq!(candle_slot_label(2), "1st Preceding Candle");
        assert_eq!(candle_slot_label(4), "3rd Preceding Candle");
        assert_eq!(candle_slot_label(12), "11th Preceding Candle");
        assert_eq!(candle_slot_label(23), "22nd Preceding Candle");
    }
}
