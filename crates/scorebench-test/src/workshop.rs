//! Workshop scheduling fixture.
//!
//! Sessions are assigned a slot and a room, speakers are assigned a slot of
//! arrival. Venues are a problem fact type without variables. Some sessions
//! are pinned. The fixture therefore exposes three (entity, variable) pairs
//! spread over two entity types.

use scorebench_core::{
    EntityDescriptor, PlanningSolution, SimpleScore, SolutionDescriptor, VariableDescriptor,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub speaker: usize,
    pub slot: Option<usize>,
    pub room: Option<usize>,
    pub pinned: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Speaker {
    pub arrival: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Venue {
    pub name: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkshopSolution {
    pub venues: Vec<Venue>,
    pub sessions: Vec<Session>,
    pub speakers: Vec<Speaker>,
    pub slot_count: usize,
    pub room_count: usize,
    pub score: Option<SimpleScore>,
}

impl PlanningSolution for WorkshopSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

/// Descriptor index of the session entity type.
pub const SESSION_DESCRIPTOR: usize = 1;
/// Descriptor index of the speaker entity type.
pub const SPEAKER_DESCRIPTOR: usize = 2;

pub fn get_slot(s: &WorkshopSolution, i: usize) -> Option<usize> {
    s.sessions[i].slot
}

pub fn set_slot(s: &mut WorkshopSolution, i: usize, v: Option<usize>) {
    s.sessions[i].slot = v;
}

pub fn get_room(s: &WorkshopSolution, i: usize) -> Option<usize> {
    s.sessions[i].room
}

pub fn set_room(s: &mut WorkshopSolution, i: usize, v: Option<usize>) {
    s.sessions[i].room = v;
}

pub fn get_arrival(s: &WorkshopSolution, i: usize) -> Option<usize> {
    s.speakers[i].arrival
}

pub fn set_arrival(s: &mut WorkshopSolution, i: usize, v: Option<usize>) {
    s.speakers[i].arrival = v;
}

fn slot_count(s: &WorkshopSolution) -> usize {
    s.slot_count
}

fn room_count(s: &WorkshopSolution) -> usize {
    s.room_count
}

/// Descriptor order: Venue (no variables), Session (slot, room), Speaker (arrival).
pub fn create_workshop_descriptor() -> SolutionDescriptor<WorkshopSolution> {
    SolutionDescriptor::new("WorkshopSolution")
        .with_entity(EntityDescriptor::new("Venue", |s: &WorkshopSolution| {
            s.venues.len()
        }))
        .with_entity(
            EntityDescriptor::new("Session", |s: &WorkshopSolution| s.sessions.len())
                .with_pinning(|s: &WorkshopSolution, i| s.sessions[i].pinned)
                .with_variable(VariableDescriptor::new("slot", get_slot, set_slot, slot_count))
                .with_variable(VariableDescriptor::new("room", get_room, set_room, room_count)),
        )
        .with_entity(
            EntityDescriptor::new("Speaker", |s: &WorkshopSolution| s.speakers.len())
                .with_variable(VariableDescriptor::new(
                    "arrival",
                    get_arrival,
                    set_arrival,
                    slot_count,
                )),
        )
}

/// A descriptor exposing only the venue fact type: no selectable moves.
pub fn create_fact_only_descriptor() -> SolutionDescriptor<WorkshopSolution> {
    SolutionDescriptor::new("WorkshopSolution").with_entity(EntityDescriptor::new(
        "Venue",
        |s: &WorkshopSolution| s.venues.len(),
    ))
}

/// Creates a fully assigned workshop with `session_count` sessions.
///
/// Session `i` is given by speaker `i % speaker_count`, starts in slot
/// `i % slot_count` and room 0. Session 0 is pinned.
pub fn create_workshop(
    session_count: usize,
    speaker_count: usize,
    slot_count: usize,
    room_count: usize,
) -> WorkshopSolution {
    let sessions = (0..session_count)
        .map(|i| Session {
            speaker: i % speaker_count,
            slot: Some(i % slot_count),
            room: Some(0),
            pinned: i == 0,
        })
        .collect();
    let speakers = (0..speaker_count)
        .map(|_| Speaker { arrival: Some(0) })
        .collect();
    WorkshopSolution {
        venues: vec![Venue { name: "Main hall" }, Venue { name: "Annex" }],
        sessions,
        speakers,
        slot_count,
        room_count,
        score: None,
    }
}

/// Full score calculation.
///
/// - 2 points per pair of sessions sharing a slot and a room
/// - 1 point per pair of sessions of the same speaker sharing a slot
/// - 1 point per session scheduled before its speaker arrives
pub fn calculate_workshop_score(s: &WorkshopSolution) -> SimpleScore {
    let mut penalty = 0i64;
    for (i, a) in s.sessions.iter().enumerate() {
        for b in &s.sessions[i + 1..] {
            if a.slot.is_some() && a.slot == b.slot {
                if a.room.is_some() && a.room == b.room {
                    penalty += 2;
                }
                if a.speaker == b.speaker {
                    penalty += 1;
                }
            }
        }
        if let (Some(slot), Some(arrival)) = (a.slot, s.speakers[a.speaker].arrival) {
            if slot < arrival {
                penalty += 1;
            }
        }
    }
    SimpleScore::of(-penalty)
}
