//! Examination timetabling: assign every exam a period and a room.
//!
//! Exams come in two kinds. A leading exam chooses its own period and room.
//! A following exam coincides with its leading exam: it chooses a room, and
//! its period is a shadow variable copied from the leader by a variable
//! listener.
//!
//! Hard constraints:
//! - exams sharing students must not share a period (weighted by shared students)
//! - the students seated in a room during a period must fit its capacity
//!
//! Soft constraints: every period and room carries a usage penalty.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use scorebench_config::ExaminationConfig;
use scorebench_core::{
    EntityDescriptor, HardSoftScore, PlanningSolution, SolutionDescriptor, VariableDescriptor,
};
use scorebench_scoring::{IncrementalScoreCalculator, ShadowVariableRef, ShadowVariableSupport};

const MIN_EXAMS_PER_STUDENT: usize = 2;
const MAX_EXAMS_PER_STUDENT: usize = 5;
const FOLLOWING_EXAM_PROBABILITY: f64 = 0.1;

pub const PERIOD_DESCRIPTOR: usize = 0;
pub const ROOM_DESCRIPTOR: usize = 1;
pub const LEADING_EXAM_DESCRIPTOR: usize = 2;
pub const FOLLOWING_EXAM_DESCRIPTOR: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exam {
    pub size: i64,
    /// Exams sharing students with this one, with the shared student count.
    pub conflicts: Vec<(usize, i64)>,
    pub period: Option<usize>,
    pub room: Option<usize>,
    /// Exam index of the leading exam, for a following exam.
    pub leader: Option<usize>,
    /// Following exam indices (entity indices, not exam indices) of a leading exam.
    pub followers: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Period {
    pub penalty: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub capacity: i64,
    pub penalty: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExaminationSolution {
    pub exams: Vec<Exam>,
    /// Exam indices of the leading exams, in entity order.
    pub leading_exams: Vec<usize>,
    /// Exam indices of the following exams, in entity order.
    pub following_exams: Vec<usize>,
    pub periods: Vec<Period>,
    pub rooms: Vec<Room>,
    pub score: Option<HardSoftScore>,
}

impl ExaminationSolution {
    fn slot(&self, period: usize, room: usize) -> usize {
        period * self.rooms.len() + room
    }

    /// Maps an entity of the `LeadingExam` or `FollowingExam` type to its exam index.
    ///
    /// # Panics
    ///
    /// If `descriptor_index` is not an exam entity type.
    pub fn exam_index(&self, descriptor_index: usize, entity_index: usize) -> usize {
        match descriptor_index {
            LEADING_EXAM_DESCRIPTOR => self.leading_exams[entity_index],
            FOLLOWING_EXAM_DESCRIPTOR => self.following_exams[entity_index],
            _ => panic!("descriptor {descriptor_index} is not an exam entity type"),
        }
    }
}

impl PlanningSolution for ExaminationSolution {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

impl ShadowVariableSupport for ExaminationSolution {
    fn shadow_variables(&self, out: &mut Vec<ShadowVariableRef>) {
        out.extend(
            (0..self.following_exams.len())
                .map(|i| ShadowVariableRef::new(FOLLOWING_EXAM_DESCRIPTOR, i, "period")),
        );
    }

    fn shadow_dependents(
        &self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
        out: &mut Vec<ShadowVariableRef>,
    ) {
        if descriptor_index != LEADING_EXAM_DESCRIPTOR || variable_name != "period" {
            return;
        }
        let leader = &self.exams[self.leading_exams[entity_index]];
        out.extend(
            leader
                .followers
                .iter()
                .map(|&i| ShadowVariableRef::new(FOLLOWING_EXAM_DESCRIPTOR, i, "period")),
        );
    }

    fn update_shadow(&mut self, shadow: ShadowVariableRef) {
        let exam = self.following_exams[shadow.entity_index];
        let period = self.exams[exam].leader.and_then(|l| self.exams[l].period);
        self.exams[exam].period = period;
    }
}

fn get_leading_period(s: &ExaminationSolution, i: usize) -> Option<usize> {
    s.exams[s.leading_exams[i]].period
}

fn set_leading_period(s: &mut ExaminationSolution, i: usize, v: Option<usize>) {
    let exam = s.leading_exams[i];
    s.exams[exam].period = v;
}

fn get_leading_room(s: &ExaminationSolution, i: usize) -> Option<usize> {
    s.exams[s.leading_exams[i]].room
}

fn set_leading_room(s: &mut ExaminationSolution, i: usize, v: Option<usize>) {
    let exam = s.leading_exams[i];
    s.exams[exam].room = v;
}

fn get_following_room(s: &ExaminationSolution, i: usize) -> Option<usize> {
    s.exams[s.following_exams[i]].room
}

fn set_following_room(s: &mut ExaminationSolution, i: usize, v: Option<usize>) {
    let exam = s.following_exams[i];
    s.exams[exam].room = v;
}

fn leading_exam_count(s: &ExaminationSolution) -> usize {
    s.leading_exams.len()
}

fn following_exam_count(s: &ExaminationSolution) -> usize {
    s.following_exams.len()
}

fn period_count(s: &ExaminationSolution) -> usize {
    s.periods.len()
}

fn room_count(s: &ExaminationSolution) -> usize {
    s.rooms.len()
}

/// Descriptor order: Period (fact), Room (fact), LeadingExam (period, room),
/// FollowingExam (room).
pub fn create_descriptor() -> SolutionDescriptor<ExaminationSolution> {
    SolutionDescriptor::new("ExaminationSolution")
        .with_entity(EntityDescriptor::new("Period", period_count))
        .with_entity(EntityDescriptor::new("Room", room_count))
        .with_entity(
            EntityDescriptor::new("LeadingExam", leading_exam_count)
                .with_variable(VariableDescriptor::new(
                    "period",
                    get_leading_period,
                    set_leading_period,
                    period_count,
                ))
                .with_variable(VariableDescriptor::new(
                    "room",
                    get_leading_room,
                    set_leading_room,
                    room_count,
                )),
        )
        .with_entity(
            EntityDescriptor::new("FollowingExam", following_exam_count).with_variable(
                VariableDescriptor::new("room", get_following_room, set_following_room, room_count),
            ),
        )
}

/// Generates an instance from `config` with every genuine variable assigned.
///
/// Every student enrolls in a few distinct exams. Room capacities are drawn
/// around the average load of a (period, room) pair. The periods of
/// following exams are left unset until the variable listeners run.
pub fn generate(config: &ExaminationConfig, seed: u64) -> ExaminationSolution {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let exam_count = config.exam_count;

    let mut sizes = vec![0i64; exam_count];
    let mut shared: BTreeMap<(usize, usize), i64> = BTreeMap::new();
    for _ in 0..config.student_count {
        let wanted = rng.random_range(MIN_EXAMS_PER_STUDENT..=MAX_EXAMS_PER_STUDENT);
        let mut enrolled: Vec<usize> = (0..wanted.min(exam_count))
            .map(|_| rng.random_range(0..exam_count))
            .collect();
        enrolled.sort_unstable();
        enrolled.dedup();
        for (k, &a) in enrolled.iter().enumerate() {
            sizes[a] += 1;
            for &b in &enrolled[k + 1..] {
                *shared.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    let mut conflicts = vec![Vec::new(); exam_count];
    for ((a, b), count) in shared {
        conflicts[a].push((b, count));
        conflicts[b].push((a, count));
    }

    let total_seats: i64 = sizes.iter().sum();
    let slots = (config.period_count * config.room_count).max(1) as i64;
    let average_load = (total_seats / slots).max(1);
    let rooms = (0..config.room_count)
        .map(|_| Room {
            capacity: rng.random_range(average_load..=average_load * 2),
            penalty: rng.random_range(0..=3),
        })
        .collect();
    let periods = (0..config.period_count)
        .map(|_| Period {
            penalty: rng.random_range(0..=5),
        })
        .collect();

    let mut exams: Vec<Exam> = sizes
        .into_iter()
        .zip(conflicts)
        .map(|(size, conflicts)| Exam {
            size,
            conflicts,
            period: None,
            room: Some(rng.random_range(0..config.room_count)),
            leader: None,
            followers: Vec::new(),
        })
        .collect();

    // The first exam always leads, so every follower has an earlier leader.
    let mut leading_exams = Vec::new();
    let mut following_exams = Vec::new();
    for exam in 0..exams.len() {
        if !leading_exams.is_empty() && rng.random_bool(FOLLOWING_EXAM_PROBABILITY) {
            let leader = leading_exams[rng.random_range(0..leading_exams.len())];
            exams[exam].leader = Some(leader);
            exams[leader].followers.push(following_exams.len());
            following_exams.push(exam);
        } else {
            exams[exam].period = Some(rng.random_range(0..config.period_count));
            leading_exams.push(exam);
        }
    }

    ExaminationSolution {
        exams,
        leading_exams,
        following_exams,
        periods,
        rooms,
        score: None,
    }
}

/// Full score calculation.
pub fn calculate_score(s: &ExaminationSolution) -> HardSoftScore {
    let mut hard = 0i64;
    let mut soft = 0i64;
    let mut loads = vec![0i64; s.periods.len() * s.rooms.len()];

    for (i, exam) in s.exams.iter().enumerate() {
        if let Some(period) = exam.period {
            for &(other, count) in &exam.conflicts {
                if other > i && s.exams[other].period == Some(period) {
                    hard -= count;
                }
            }
            soft -= s.periods[period].penalty;
            if let Some(room) = exam.room {
                loads[s.slot(period, room)] += exam.size;
            }
        }
        if let Some(room) = exam.room {
            soft -= s.rooms[room].penalty;
        }
    }

    for period in 0..s.periods.len() {
        for (room_index, room) in s.rooms.iter().enumerate() {
            hard -= (loads[s.slot(period, room_index)] - room.capacity).max(0);
        }
    }

    HardSoftScore::of(hard, soft)
}

/// Incremental calculator keeping the seated load of every (period, room).
///
/// A changing exam is retracted with its old period and room, then
/// inserted with the new ones. Shadow period changes of following exams
/// arrive as ordinary change notifications.
#[derive(Debug, Default)]
pub struct ExaminationIncrementalCalculator {
    loads: Vec<i64>,
    hard: i64,
    soft: i64,
}

impl ExaminationIncrementalCalculator {
    fn overflow(&self, solution: &ExaminationSolution, slot: usize, room: usize) -> i64 {
        (self.loads[slot] - solution.rooms[room].capacity).max(0)
    }

    fn insert(&mut self, solution: &ExaminationSolution, i: usize) {
        let exam = &solution.exams[i];
        if let Some(period) = exam.period {
            for &(other, count) in &exam.conflicts {
                if solution.exams[other].period == Some(period) {
                    self.hard -= count;
                }
            }
            self.soft -= solution.periods[period].penalty;
            if let Some(room) = exam.room {
                let slot = solution.slot(period, room);
                let before = self.overflow(solution, slot, room);
                self.loads[slot] += exam.size;
                self.hard -= self.overflow(solution, slot, room) - before;
            }
        }
        if let Some(room) = exam.room {
            self.soft -= solution.rooms[room].penalty;
        }
    }

    fn retract(&mut self, solution: &ExaminationSolution, i: usize) {
        let exam = &solution.exams[i];
        if let Some(period) = exam.period {
            for &(other, count) in &exam.conflicts {
                if solution.exams[other].period == Some(period) {
                    self.hard += count;
                }
            }
            self.soft += solution.periods[period].penalty;
            if let Some(room) = exam.room {
                let slot = solution.slot(period, room);
                let before = self.overflow(solution, slot, room);
                self.loads[slot] -= exam.size;
                self.hard += before - self.overflow(solution, slot, room);
            }
        }
        if let Some(room) = exam.room {
            self.soft += solution.rooms[room].penalty;
        }
    }
}

impl IncrementalScoreCalculator<ExaminationSolution> for ExaminationIncrementalCalculator {
    fn reset_working_solution(&mut self, solution: &ExaminationSolution, _: bool) {
        let score = calculate_score(solution);
        self.hard = score.hard();
        self.soft = score.soft();
        self.loads = vec![0; solution.periods.len() * solution.rooms.len()];
        for exam in &solution.exams {
            if let (Some(period), Some(room)) = (exam.period, exam.room) {
                self.loads[solution.slot(period, room)] += exam.size;
            }
        }
    }

    fn before_variable_changed(&mut self, solution: &ExaminationSolution, d: usize, i: usize, _: &str) {
        self.retract(solution, solution.exam_index(d, i));
    }

    fn after_variable_changed(&mut self, solution: &ExaminationSolution, d: usize, i: usize, _: &str) {
        self.insert(solution, solution.exam_index(d, i));
    }

    fn calculate_score(&mut self) -> HardSoftScore {
        HardSoftScore::of(self.hard, self.soft)
    }
}
