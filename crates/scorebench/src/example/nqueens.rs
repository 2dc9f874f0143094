//! N-Queens: place `n` queens on an `n`×`n` board, one per column.
//!
//! Each queen's column is fixed; its row is the only planning variable.
//! The score counts attacking pairs on rows and both diagonals.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scorebench_core::{
    EntityDescriptor, PlanningSolution, SimpleScore, SolutionDescriptor, VariableDescriptor,
};
use scorebench_scoring::{ConstraintMatchTotal, IncrementalScoreCalculator};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Queen {
    pub column: usize,
    pub row: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NQueensSolution {
    pub n: usize,
    pub queens: Vec<Queen>,
    pub score: Option<SimpleScore>,
}

impl PlanningSolution for NQueensSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

fn get_row(s: &NQueensSolution, i: usize) -> Option<usize> {
    s.queens[i].row
}

fn set_row(s: &mut NQueensSolution, i: usize, v: Option<usize>) {
    s.queens[i].row = v;
}

fn queen_count(s: &NQueensSolution) -> usize {
    s.queens.len()
}

fn row_count(s: &NQueensSolution) -> usize {
    s.n
}

pub fn create_descriptor() -> SolutionDescriptor<NQueensSolution> {
    SolutionDescriptor::new("NQueensSolution").with_entity(
        EntityDescriptor::new("Queen", queen_count)
            .with_variable(VariableDescriptor::new("row", get_row, set_row, row_count)),
    )
}

/// Generates an `n`-queens board with every queen on a random row.
pub fn generate(n: usize, seed: u64) -> NQueensSolution {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let queens = (0..n)
        .map(|column| Queen {
            column,
            row: Some(rng.random_range(0..n)),
        })
        .collect();
    NQueensSolution {
        n,
        queens,
        score: None,
    }
}

/// Full score calculation: minus the number of attacking pairs.
pub fn calculate_score(s: &NQueensSolution) -> SimpleScore {
    let mut conflicts = 0i64;
    for (i, a) in s.queens.iter().enumerate() {
        let Some(a_row) = a.row else { continue };
        for b in &s.queens[i + 1..] {
            let Some(b_row) = b.row else { continue };
            if a_row == b_row {
                conflicts += 1;
            }
            if a_row + a.column == b_row + b.column {
                conflicts += 1;
            }
            if a_row + b.column == b_row + a.column {
                conflicts += 1;
            }
        }
    }
    SimpleScore::of(-conflicts)
}

const ROW_CONFLICT: &str = "Horizontal conflict";
const ASCENDING_CONFLICT: &str = "Ascending diagonal conflict";
const DESCENDING_CONFLICT: &str = "Descending diagonal conflict";

/// One attacking pair, justified by the line both queens stand on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueenConflict {
    pub constraint_name: &'static str,
    /// Columns of the two queens, lowest first.
    pub queens: (usize, usize),
}

// Columns of the queens standing on every row and diagonal.
#[derive(Debug, Default)]
struct LineMembers {
    rows: Vec<Vec<usize>>,
    ascending: Vec<Vec<usize>>,
    descending: Vec<Vec<usize>>,
}

impl LineMembers {
    fn new(n: usize) -> Self {
        Self {
            rows: vec![Vec::new(); n],
            ascending: vec![Vec::new(); 2 * n],
            descending: vec![Vec::new(); 2 * n],
        }
    }

    fn insert(&mut self, (row, asc, desc): (usize, usize, usize), column: usize) {
        self.rows[row].push(column);
        self.ascending[asc].push(column);
        self.descending[desc].push(column);
    }

    fn retract(&mut self, (row, asc, desc): (usize, usize, usize), column: usize) {
        for line in [&mut self.rows[row], &mut self.ascending[asc], &mut self.descending[desc]] {
            if let Some(position) = line.iter().position(|&c| c == column) {
                line.swap_remove(position);
            }
        }
    }

    fn constraints(&self) -> [(&'static str, &[Vec<usize>]); 3] {
        [
            (ROW_CONFLICT, self.rows.as_slice()),
            (ASCENDING_CONFLICT, self.ascending.as_slice()),
            (DESCENDING_CONFLICT, self.descending.as_slice()),
        ]
    }
}

/// Incremental calculator counting queens per row and per diagonal.
///
/// Inserting a queen on a line already holding `k` queens adds `k` attacking
/// pairs; retracting it removes `k - 1`. With constraint matching enabled the
/// calculator also records which queens stand on every line, so each
/// attacking pair can be justified.
#[derive(Debug, Default)]
pub struct NQueensIncrementalCalculator {
    rows: Vec<i64>,
    ascending: Vec<i64>,
    descending: Vec<i64>,
    row_conflicts: i64,
    ascending_conflicts: i64,
    descending_conflicts: i64,
    members: Option<LineMembers>,
}

impl NQueensIncrementalCalculator {
    fn lines(n: usize, queen: &Queen) -> Option<(usize, usize, usize)> {
        let row = queen.row?;
        Some((row, row + queen.column, row + n - 1 - queen.column))
    }

    fn insert(&mut self, n: usize, queen: &Queen) {
        let Some(lines @ (row, asc, desc)) = Self::lines(n, queen) else {
            return;
        };
        self.row_conflicts += self.rows[row];
        self.rows[row] += 1;
        self.ascending_conflicts += self.ascending[asc];
        self.ascending[asc] += 1;
        self.descending_conflicts += self.descending[desc];
        self.descending[desc] += 1;
        if let Some(members) = self.members.as_mut() {
            members.insert(lines, queen.column);
        }
    }

    fn retract(&mut self, n: usize, queen: &Queen) {
        let Some(lines @ (row, asc, desc)) = Self::lines(n, queen) else {
            return;
        };
        self.rows[row] -= 1;
        self.row_conflicts -= self.rows[row];
        self.ascending[asc] -= 1;
        self.ascending_conflicts -= self.ascending[asc];
        self.descending[desc] -= 1;
        self.descending_conflicts -= self.descending[desc];
        if let Some(members) = self.members.as_mut() {
            members.retract(lines, queen.column);
        }
    }

    /// Returns every attacking pair; empty unless constraint matching is enabled.
    pub fn constraint_matches(&self) -> Vec<QueenConflict> {
        let Some(members) = &self.members else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for (constraint_name, lines) in members.constraints() {
            for line in lines {
                for (k, &a) in line.iter().enumerate() {
                    for &b in &line[k + 1..] {
                        matches.push(QueenConflict {
                            constraint_name,
                            queens: (a.min(b), a.max(b)),
                        });
                    }
                }
            }
        }
        matches
    }
}

impl IncrementalScoreCalculator<NQueensSolution> for NQueensIncrementalCalculator {
    fn reset_working_solution(&mut self, solution: &NQueensSolution, constraint_match_enabled: bool) {
        let n = solution.n;
        self.rows = vec![0; n];
        self.ascending = vec![0; 2 * n];
        self.descending = vec![0; 2 * n];
        self.row_conflicts = 0;
        self.ascending_conflicts = 0;
        self.descending_conflicts = 0;
        self.members = constraint_match_enabled.then(|| LineMembers::new(n));
        for queen in &solution.queens {
            self.insert(n, queen);
        }
    }

    fn before_variable_changed(&mut self, solution: &NQueensSolution, _: usize, i: usize, _: &str) {
        self.retract(solution.n, &solution.queens[i]);
    }

    fn after_variable_changed(&mut self, solution: &NQueensSolution, _: usize, i: usize, _: &str) {
        self.insert(solution.n, &solution.queens[i]);
    }

    fn calculate_score(&mut self) -> SimpleScore {
        SimpleScore::of(-(self.row_conflicts + self.ascending_conflicts + self.descending_conflicts))
    }

    fn constraint_match_totals(&self) -> Vec<ConstraintMatchTotal<SimpleScore>> {
        let Some(members) = &self.members else {
            return Vec::new();
        };
        members
            .constraints()
            .into_iter()
            .map(|(name, lines)| {
                let pairs: usize = lines
                    .iter()
                    .map(|line| line.len() * line.len().saturating_sub(1) / 2)
                    .sum();
                ConstraintMatchTotal::new(name, pairs, SimpleScore::of(-(pairs as i64)))
            })
            .collect()
    }
}
