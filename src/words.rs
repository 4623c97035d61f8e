//! Amounts written out in French words, as printed under the total of an invoice
//! ("Arrêtée la présente facture à la somme de : Quarante-deux mille cinq cents Ariary").
//!
//! Spelling follows the standard French numerals with the 1990 hyphenation (`vingt-et-un`,
//! `soixante-et-onze`). `cent` and `vingt` take a plural `s` only when they close the number or
//! precede `millions`/`milliards`; `mille` never varies.

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::{amount::CURRENCY_NAME, error::Error};

const UNITS: [&str; 20] = [
    "zéro", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix", "onze",
    "douze", "treize", "quatorze", "quinze", "seize", "dix-sept", "dix-huit", "dix-neuf",
];

const TENS: [&str; 10] = [
    "",
    "dix",
    "vingt",
    "trente",
    "quarante",
    "cinquante",
    "soixante",
    "soixante",
    "quatre-vingt",
    "quatre-vingt",
];

const THOUSAND: u64 = 1_000;
const MILLION: u64 = 1_000_000;
const BILLION: u64 = 1_000_000_000;

/// Write a whole amount of Ariary in words, capitalized and followed by the currency name.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if `amount` is negative.
///
/// # Example
/// ```rust
/// use facture::words::amount_to_words;
///
/// assert_eq!(amount_to_words(0).unwrap(), "Zéro Ariary");
/// assert_eq!(amount_to_words(42500).unwrap(), "Quarante-deux mille cinq cents Ariary");
/// assert!(amount_to_words(-1).is_err());
/// ```
pub fn amount_to_words(amount: i64) -> Result<String, Error> {
    let amount = u64::try_from(amount)
        .map_err(|_| Error::invalid_amount(format!("cannot write {amount} in words")))?;
    Ok(with_currency(&number_to_words(amount)))
}

/// [`amount_to_words`] for a decimal amount, such as a computed invoice total.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if `amount` is negative, has a fractional part,
/// or does not fit in 64 bits.
pub fn decimal_to_words(amount: &BigDecimal) -> Result<String, Error> {
    if !amount.is_integer() {
        return Err(Error::invalid_amount(format!(
            "{amount} has a fractional part and cannot be written in words"
        )));
    }
    if *amount < BigDecimal::from(0) {
        return Err(Error::invalid_amount(format!(
            "cannot write {amount} in words"
        )));
    }
    let amount = amount
        .to_u64()
        .ok_or_else(|| Error::invalid_amount(format!("{amount} is too large")))?;
    Ok(with_currency(&number_to_words(amount)))
}

/// Spell `n` in lower case French, without currency.
///
/// # Example
/// ```rust
/// use facture::words::number_to_words;
///
/// assert_eq!(number_to_words(171), "cent soixante-et-onze");
/// assert_eq!(number_to_words(2_000_000), "deux millions");
/// ```
pub fn number_to_words(n: u64) -> String {
    if n == 0 {
        return UNITS[0].to_string();
    }
    spell(n, true)
}

fn with_currency(words: &str) -> String {
    format!("{} {CURRENCY_NAME}", capitalize(words))
}

fn capitalize(words: &str) -> String {
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `n` must be non-zero. `plural_at_end` tells whether a trailing `cent`/`vingt` may take an `s`.
fn spell(n: u64, plural_at_end: bool) -> String {
    let billions = n / BILLION;
    let millions = (n / MILLION % THOUSAND) as u32;
    let thousands = (n / THOUSAND % THOUSAND) as u32;
    let units = (n % THOUSAND) as u32;

    let mut groups = Vec::with_capacity(4);
    match billions {
        0 => {}
        1 => groups.push("un milliard".to_string()),
        count if count < THOUSAND => {
            groups.push(format!("{} milliards", below_thousand(count as u32, true)))
        }
        count => groups.push(format!("{} milliards", spell(count, true))),
    }
    match millions {
        0 => {}
        1 => groups.push("un million".to_string()),
        count => groups.push(format!("{} millions", below_thousand(count, true))),
    }
    match thousands {
        0 => {}
        1 => groups.push("mille".to_string()),
        count => groups.push(format!("{} mille", below_thousand(count, false))),
    }
    if units > 0 {
        groups.push(below_thousand(units, plural_at_end));
    }
    groups.join(" ")
}

fn below_thousand(n: u32, plural: bool) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    let mut words = Vec::with_capacity(2);
    match hundreds {
        0 => {}
        1 => words.push("cent".to_string()),
        h if rest == 0 && plural => words.push(format!("{} cents", UNITS[h as usize])),
        h => words.push(format!("{} cent", UNITS[h as usize])),
    }
    if rest > 0 {
        words.push(below_hundred(rest, plural));
    }
    words.join(" ")
}

fn below_hundred(n: u32, plural: bool) -> String {
    if n < 20 {
        return UNITS[n as usize].to_string();
    }
    let tens = (n / 10) as usize;
    let unit = (n % 10) as usize;
    match (tens, unit) {
        (7, 1) => "soixante-et-onze".to_string(),
        (7 | 9, _) => format!("{}-{}", TENS[tens], UNITS[10 + unit]),
        (8, 0) if plural => "quatre-vingts".to_string(),
        (8, 0) => "quatre-vingt".to_string(),
        (8, _) => format!("quatre-vingt-{}", UNITS[unit]),
        (_, 0) => TENS[tens].to_string(),
        (_, 1) => format!("{}-et-un", TENS[tens]),
        _ => format!("{}-{}", TENS[tens], UNITS[unit]),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn words(n: i64) -> String {
        amount_to_words(n).unwrap()
    }

    #[test]
    fn canonical_values() {
        assert_eq!(words(0), "Zéro Ariary");
        assert_eq!(words(100), "Cent Ariary");
        assert_eq!(words(1000), "Mille Ariary");
        assert_eq!(words(2000), "Deux mille Ariary");
        assert_eq!(words(1_000_000), "Un million Ariary");
        assert_eq!(words(42500), "Quarante-deux mille cinq cents Ariary");
    }

    #[test]
    fn hundreds() {
        assert_eq!(number_to_words(101), "cent un");
        assert_eq!(number_to_words(171), "cent soixante-et-onze");
        assert_eq!(number_to_words(200), "deux cents");
        assert_eq!(number_to_words(201), "deux cent un");
        assert_eq!(number_to_words(999), "neuf cent quatre-vingt-dix-neuf");
    }

    #[test]
    fn tens_and_base_twenty() {
        assert_eq!(number_to_words(17), "dix-sept");
        assert_eq!(number_to_words(21), "vingt-et-un");
        assert_eq!(number_to_words(61), "soixante-et-un");
        assert_eq!(number_to_words(70), "soixante-dix");
        assert_eq!(number_to_words(77), "soixante-dix-sept");
        assert_eq!(number_to_words(80), "quatre-vingts");
        assert_eq!(number_to_words(81), "quatre-vingt-un");
        assert_eq!(number_to_words(90), "quatre-vingt-dix");
        assert_eq!(number_to_words(91), "quatre-vingt-onze");
        assert_eq!(number_to_words(95), "quatre-vingt-quinze");
    }

    #[test]
    fn scale_words_agree_in_number() {
        assert_eq!(number_to_words(1001), "mille un");
        assert_eq!(number_to_words(21_000), "vingt-et-un mille");
        assert_eq!(number_to_words(80_000), "quatre-vingt mille");
        assert_eq!(number_to_words(200_000), "deux cent mille");
        assert_eq!(number_to_words(2_000_000), "deux millions");
        assert_eq!(number_to_words(200_000_000), "deux cents millions");
        assert_eq!(number_to_words(80_000_000), "quatre-vingts millions");
        assert_eq!(number_to_words(1_000_000_000), "un milliard");
        assert_eq!(number_to_words(3_000_000_000), "trois milliards");
        assert_eq!(number_to_words(1_000_000_000_000), "mille milliards");
    }

    #[test]
    fn zero_groups_are_omitted() {
        assert_eq!(number_to_words(1_000_001), "un million un");
        assert_eq!(
            number_to_words(2_000_500_000),
            "deux milliards cinq cent mille"
        );
    }

    #[test]
    fn end_to_end_total_reads_naturally() {
        assert_eq!(
            words(182_500),
            "Cent quatre-vingt-deux mille cinq cents Ariary"
        );
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(amount_to_words(-5).unwrap_err().is_invalid_amount());
        let fractional = BigDecimal::from_str("10.5").unwrap();
        assert!(decimal_to_words(&fractional).unwrap_err().is_invalid_amount());
        let negative = BigDecimal::from(-3);
        assert!(decimal_to_words(&negative).is_err());
        let whole = BigDecimal::from_str("2000.00").unwrap();
        assert_eq!(decimal_to_words(&whole).unwrap(), "Deux mille Ariary");
    }

    #[test]
    fn output_is_deterministic() {
        assert_eq!(words(987_654_321), words(987_654_321));
        assert_eq!(
            words(987_654_321),
            "Neuf cent quatre-vingt-sept millions six cent cinquante-quatre mille trois cent vingt-et-un Ariary"
        );
    }
}
