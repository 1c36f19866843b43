//! Static habit catalogue.
//!
//! Three habit domains: five numbered activity habits, three single-letter
//! consumption kinds, three two-letter language codes. Loaded at compile
//! time, never mutated.

/// The sentinel written into a checkmark cell. Once a cell is non-empty
/// it is permanent for that day; there is no undo.
pub const CHECKMARK: &str = "✓";

/// How often a habit is expected to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Weekly,
}

impl Cadence {
    /// Maximum completions per week. Daily habits cap at 6 because Sunday
    /// is a rest day; weekly habits are done once.
    pub fn weekly_max(self) -> u32 {
        match self {
            Cadence::Daily => 6,
            Cadence::Weekly => 1,
        }
    }
}

/// A numbered activity habit.
#[derive(Debug, Clone, Copy)]
pub struct ActivityHabit {
    pub id: u8,
    pub name: &'static str,
    pub cadence: Cadence,
}

/// The five activity habits, ids 1-5. Ids 1-3 are daily, 4-5 weekly.
pub const ACTIVITY_HABITS: [ActivityHabit; 5] = [
    ActivityHabit {
        id: 1,
        name: "Prayer with first water",
        cadence: Cadence::Daily,
    },
    ActivityHabit {
        id: 2,
        name: "Qi Gong routine",
        cadence: Cadence::Daily,
    },
    ActivityHabit {
        id: 3,
        name: "Freestyling on the ball",
        cadence: Cadence::Daily,
    },
    ActivityHabit {
        id: 4,
        name: "20 minute run and stretch",
        cadence: Cadence::Weekly,
    },
    ActivityHabit {
        id: 5,
        name: "Strengthening and stretching session",
        cadence: Cadence::Weekly,
    },
];

/// Look up an activity habit by its 1-based id.
pub fn activity_habit(id: u8) -> Option<&'static ActivityHabit> {
    ACTIVITY_HABITS.iter().find(|h| h.id == id)
}

/// A consumption habit keyed by a single letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionKind {
    Coffee,
    Sugar,
    Flour,
}

impl ConsumptionKind {
    pub const ALL: [ConsumptionKind; 3] = [
        ConsumptionKind::Coffee,
        ConsumptionKind::Sugar,
        ConsumptionKind::Flour,
    ];

    pub fn letter(self) -> char {
        match self {
            ConsumptionKind::Coffee => 'x',
            ConsumptionKind::Sugar => 'y',
            ConsumptionKind::Flour => 'z',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConsumptionKind::Coffee => "Coffee",
            ConsumptionKind::Sugar => "Sugary food",
            ConsumptionKind::Flour => "Flour-based food",
        }
    }

    /// Position in the fixed x, y, z order.
    pub fn index(self) -> usize {
        match self {
            ConsumptionKind::Coffee => 0,
            ConsumptionKind::Sugar => 1,
            ConsumptionKind::Flour => 2,
        }
    }

    pub fn from_letter(c: char) -> Option<ConsumptionKind> {
        match c {
            'x' => Some(ConsumptionKind::Coffee),
            'y' => Some(ConsumptionKind::Sugar),
            'z' => Some(ConsumptionKind::Flour),
            _ => None,
        }
    }
}

/// A language-learning habit keyed by a two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCode {
    Chinese,
    Hebrew,
    Tatar,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 3] = [
        LanguageCode::Chinese,
        LanguageCode::Hebrew,
        LanguageCode::Tatar,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LanguageCode::Chinese => "ch",
            LanguageCode::Hebrew => "he",
            LanguageCode::Tatar => "ta",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LanguageCode::Chinese => "Chinese activation",
            LanguageCode::Hebrew => "Hebrew cards",
            LanguageCode::Tatar => "Tatar cards",
        }
    }

    /// Position in the fixed ch, he, ta order.
    pub fn index(self) -> usize {
        match self {
            LanguageCode::Chinese => 0,
            LanguageCode::Hebrew => 1,
            LanguageCode::Tatar => 2,
        }
    }

    pub fn from_code(s: &str) -> Option<LanguageCode> {
        match s {
            "ch" => Some(LanguageCode::Chinese),
            "he" => Some(LanguageCode::Hebrew),
            "ta" => Some(LanguageCode::Tatar),
            _ => None,
        }
    }
}
