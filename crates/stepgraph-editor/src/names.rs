//! Two-letter generated names for nodes (`AA`, `AB`, …) and edges (`aa`, …).

const LETTERS: usize = 26;

/// Letter case of a [`NameSeq`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LetterCase {
    Upper,
    Lower,
}

/// Counter producing `AA, AB, …, AZ, BA, …, ZZ`, then wrapping to `AA`.
#[derive(Clone, Debug)]
pub struct NameSeq {
    case: LetterCase,
    counter: usize,
}

impl NameSeq {
    /// Sequence used for node names.
    pub fn upper() -> Self {
        Self {
            case: LetterCase::Upper,
            counter: 0,
        }
    }

    /// Sequence used for edge names.
    pub fn lower() -> Self {
        Self {
            case: LetterCase::Lower,
            counter: 0,
        }
    }

    /// Produce the next name and advance.
    pub fn next_name(&mut self) -> String {
        let n = self.counter;
        self.counter = self.counter.wrapping_add(1);
        let base = match self.case {
            LetterCase::Upper => b'A',
            LetterCase::Lower => b'a',
        };
        let hi = (n / LETTERS % LETTERS) as u8;
        let lo = (n % LETTERS) as u8;
        [char::from(base + hi), char::from(base + lo)].iter().collect()
    }

    /// Number of names handed out since the last reset.
    pub fn issued(&self) -> usize {
        self.counter
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
