//! Spanish spelled-out currency amounts for `totalLetras`.

use rust_decimal::Decimal;

use super::format::round_decimal;

const UNITS: [&str; 30] = [
    "cero",
    "uno",
    "dos",
    "tres",
    "cuatro",
    "cinco",
    "seis",
    "siete",
    "ocho",
    "nueve",
    "diez",
    "once",
    "doce",
    "trece",
    "catorce",
    "quince",
    "dieciséis",
    "diecisiete",
    "dieciocho",
    "diecinueve",
    "veinte",
    "veintiuno",
    "veintidós",
    "veintitrés",
    "veinticuatro",
    "veinticinco",
    "veintiséis",
    "veintisiete",
    "veintiocho",
    "veintinueve",
];

const TENS: [&str; 10] = [
    "", "", "", "treinta", "cuarenta", "cincuenta", "sesenta", "setenta", "ochenta", "noventa",
];

const HUNDREDS: [&str; 10] = [
    "",
    "ciento",
    "doscientos",
    "trescientos",
    "cuatrocientos",
    "quinientos",
    "seiscientos",
    "setecientos",
    "ochocientos",
    "novecientos",
];

/// Spell out a monetary amount, e.g. `100.50` →
/// `"CIEN DÓLARES Y CINCUENTA CENTAVOS"`.
///
/// The amount is rounded to cents first. Zero cents omit the centavos clause.
/// Every `Decimal` has a spelling. Past a million billones the group words
/// nest, e.g. 10^18 reads "UN MILLÓN BILLONES".
pub fn amount_to_words(amount: Decimal) -> String {
    let rounded = round_decimal(amount.abs(), 2);
    let dollars = whole_part(rounded);
    let cents = whole_part((rounded - rounded.trunc()) * Decimal::ONE_HUNDRED);

    let mut out = format!("{} DÓLARES", spell_number(dollars).to_uppercase());
    if cents > 0 {
        out.push_str(&format!(" Y {} CENTAVOS", spell_number(cents).to_uppercase()));
    }
    out
}

/// Integer part of a non-negative amount. A `Decimal` mantissa is 96 bits,
/// so it always fits.
fn whole_part(amount: Decimal) -> u128 {
    let mut whole = amount.trunc();
    whole.rescale(0);
    whole.mantissa().unsigned_abs()
}

/// Spell out a non-negative integer in lowercase Spanish.
pub fn spell_number(n: u128) -> String {
    if n == 0 {
        return UNITS[0].to_string();
    }
    spell(n, false)
}

/// Long scale: groups of six digits, each named "millón" or "billón".
/// Billions recurse, so any `u128` is covered.
fn spell(n: u128, apocope: bool) -> String {
    let mut parts: Vec<String> = Vec::new();

    let billions = n / 1_000_000_000_000;
    let millions = ((n / 1_000_000) % 1_000_000) as u32;
    let below = (n % 1_000_000) as u32;

    if billions > 0 {
        parts.push(match billions {
            1 => "un billón".to_string(),
            _ => format!("{} billones", spell(billions, true)),
        });
    }
    if millions > 0 {
        parts.push(match millions {
            1 => "un millón".to_string(),
            _ => format!("{} millones", below_million(millions, true)),
        });
    }
    if below > 0 {
        parts.push(below_million(below, apocope));
    }

    parts.join(" ")
}

fn below_million(n: u32, apocope: bool) -> String {
    let thousands = n / 1_000;
    let rest = n % 1_000;
    let mut parts = Vec::new();
    if thousands > 0 {
        parts.push(match thousands {
            1 => "mil".to_string(),
            _ => format!("{} mil", below_thousand(thousands, true)),
        });
    }
    if rest > 0 {
        parts.push(below_thousand(rest, apocope));
    }
    parts.join(" ")
}

/// `apocope` shortens a trailing "uno" to "un" (before "mil", "millones").
fn below_thousand(n: u32, apocope: bool) -> String {
    debug_assert!(n < 1_000);
    let hundreds = (n / 100) as usize;
    let rest = n % 100;

    if n == 100 {
        return "cien".to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds].to_string());
    }
    if rest > 0 {
        parts.push(below_hundred(rest, apocope));
    }
    parts.join(" ")
}

fn below_hundred(n: u32, apocope: bool) -> String {
    debug_assert!(n < 100);
    let idx = n as usize;
    if idx < 30 {
        return match (idx, apocope) {
            (1, true) => "un".to_string(),
            (21, true) => "veintiún".to_string(),
            _ => UNITS[idx].to_string(),
        };
    }
    let tens = TENS[idx / 10];
    match idx % 10 {
        0 => tens.to_string(),
        1 if apocope => format!("{tens} y un"),
        u => format!("{tens} y {}", UNITS[u]),
    }
}
