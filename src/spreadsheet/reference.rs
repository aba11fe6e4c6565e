//! A1-style cell references, 1-based on both axes.

/// Converts a 1-based column number to its letters (1 → "A", 27 → "AA").
pub fn column_to_letters(column: usize) -> String {
    let mut column = column;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, char::from(b'A' + (column % 26) as u8));
        column /= 26;
    }
    letters
}

/// Converts column letters to a 1-based column number, case-insensitive.
pub fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0usize, |column, letter| {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = letter.to_ascii_uppercase() as usize - 'A' as usize + 1;
        column.checked_mul(26)?.checked_add(digit)
    })
}

/// Formats a 1-based (row, column) pair as "B3".
pub fn index_to_reference(row: usize, column: usize) -> String {
    format!("{}{}", column_to_letters(column), row)
}

/// Parses "B3" (or "$B$3") into a 1-based (row, column) pair.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    let column = letters_to_column(letters)?;
    let row = digits.parse::<usize>().ok().filter(|row| *row > 0)?;
    Some((row, column))
}
