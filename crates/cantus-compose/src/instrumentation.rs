//! Instrumentation allocator: role outputs to instrument tracks.
//!
//! Requested instruments are nominated to roles in the order melody,
//! harmony, bass, percussion. An instrument that cannot play its nominated
//! role moves to its best role with an
//! [`DiagnosticCode::InstrumentReassignment`] warning. Roles still empty are
//! filled from the style defaults, then from the catalog. Surplus requests
//! double their best role. An instrument whose best role the piece does not
//! use is left out, and the warning says so.

use tracing::{debug, warn};

use cantus_spec::note::sort_notes;
use cantus_spec::{
    Diagnostic, DiagnosticCode, Diagnostics, InstrumentId, MusicParameters, NoteEvent, Role, Track,
};

use crate::accompaniment::AccompanimentPart;
use crate::outcome::StageOutcome;

const STAGE: &str = "instrumentation";

/// Generated notes for every role, before instruments are chosen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleOutputs {
    pub melody: Vec<NoteEvent>,
    pub parts: Vec<AccompanimentPart>,
    pub bass: Vec<NoteEvent>,
    pub percussion: Vec<NoteEvent>,
}

/// Instruments chosen for each role, in track order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    pub melody: Vec<InstrumentId>,
    pub harmony: Vec<InstrumentId>,
    pub bass: Vec<InstrumentId>,
    pub percussion: Vec<InstrumentId>,
}

impl Assignment {
    fn slot(&mut self, role: Role) -> &mut Vec<InstrumentId> {
        match role {
            Role::Melody => &mut self.melody,
            Role::Harmony => &mut self.harmony,
            Role::Bass => &mut self.bass,
            Role::Percussion => &mut self.percussion,
        }
    }

    /// Instruments assigned to a role.
    pub fn for_role(&self, role: Role) -> &[InstrumentId] {
        match role {
            Role::Melody => &self.melody,
            Role::Harmony => &self.harmony,
            Role::Bass => &self.bass,
            Role::Percussion => &self.percussion,
        }
    }

    fn contains(&self, instrument: InstrumentId) -> bool {
        Role::ALL
            .iter()
            .any(|&role| self.for_role(role).contains(&instrument))
    }
}

/// Roles the piece needs covered.
pub fn required_roles(params: &MusicParameters, outputs: &RoleOutputs) -> Vec<Role> {
    let mut roles = vec![Role::Melody];
    if !outputs.parts.is_empty() {
        roles.push(Role::Harmony);
    }
    roles.push(Role::Bass);
    if params.percussion {
        roles.push(Role::Percussion);
    }
    roles
}

/// Choose instruments for each role.
pub fn assign_roles(params: &MusicParameters, required: &[Role]) -> (Assignment, Diagnostics) {
    let mut assignment = Assignment::default();
    let mut diagnostics = Diagnostics::new();

    let mut requested: Vec<InstrumentId> = Vec::new();
    for &instrument in &params.instruments {
        if !requested.contains(&instrument) {
            requested.push(instrument);
        }
    }

    for (i, &instrument) in requested.iter().enumerate() {
        let open = required
            .iter()
            .copied()
            .find(|&role| assignment.for_role(role).is_empty());
        let best = instrument.info().best_role;
        let (role, nominated) = match open {
            Some(role) if instrument.can_play(role) => (role, None),
            Some(role) => (best, Some(role)),
            None => (best, None),
        };
        let unused = !required.contains(&role);
        if nominated.is_none() && !unused {
            assignment.slot(role).push(instrument);
            continue;
        }

        let mut message = match nominated {
            Some(nominated) => format!("{} cannot play {}", instrument, nominated),
            None => format!("{} is surplus", instrument),
        };
        if unused {
            warn!(%instrument, best = %role, "instrument left out");
            message.push_str(&format!(
                "; its best role {} is not used in this piece, left out",
                role
            ));
        } else {
            warn!(%instrument, nominated = ?nominated, assigned = %role, "instrument reassigned");
            message.push_str(&format!("; assigned to {}", role));
            assignment.slot(role).push(instrument);
        }
        diagnostics.push(
            Diagnostic::new(DiagnosticCode::InstrumentReassignment, STAGE, message)
                .with_path(format!("instruments[{}]", i)),
        );
    }

    for &role in required {
        if !assignment.for_role(role).is_empty() {
            continue;
        }
        let pick = fill_from_defaults(&params.default_instruments, role, &assignment)
            .unwrap_or_else(|| InstrumentId::default_for_role(role));
        debug!(%role, instrument = %pick, "filled role from defaults");
        assignment.slot(role).push(pick);
    }

    (assignment, diagnostics)
}

/// First unused default suited to `role`, preferring instruments whose best
/// role it is.
fn fill_from_defaults(
    defaults: &[InstrumentId],
    role: Role,
    assignment: &Assignment,
) -> Option<InstrumentId> {
    let unused = || {
        defaults
            .iter()
            .copied()
            .filter(|&id| id.can_play(role) && !assignment.contains(id))
    };
    unused()
        .find(|id| id.info().best_role == role)
        .or_else(|| unused().next())
}

/// Turn role outputs into instrument tracks.
pub fn allocate_instruments(
    params: &MusicParameters,
    outputs: RoleOutputs,
) -> StageOutcome<Vec<Track>> {
    let required = required_roles(params, &outputs);
    let (assignment, diagnostics) = assign_roles(params, &required);

    let mut tracks: Vec<Track> = Vec::new();
    let mut push = |instrument: InstrumentId, role: Role, part: &str, notes: &[NoteEvent]| {
        let index = tracks.len() as u16;
        let mut notes: Vec<NoteEvent> = notes
            .iter()
            .map(|n| NoteEvent {
                pitch: if role == Role::Percussion {
                    n.pitch
                } else {
                    instrument.fold_into_range(n.pitch)
                },
                track: Some(index),
                ..n.clone()
            })
            .collect();
        sort_notes(&mut notes);
        debug!(index, %instrument, %role, part, notes = notes.len(), "allocated track");
        tracks.push(Track {
            index,
            instrument,
            role,
            part: part.to_string(),
            notes,
        });
    };

    for &instrument in &assignment.melody {
        push(instrument, Role::Melody, "lead", &outputs.melody);
    }

    // Parts rotate through the harmony instruments; spare instruments double.
    let harmony = &assignment.harmony;
    if !harmony.is_empty() && !outputs.parts.is_empty() {
        let parts = &outputs.parts;
        for (j, part) in parts.iter().enumerate() {
            push(harmony[j % harmony.len()], Role::Harmony, part.name(), &part.notes);
        }
        for (i, &instrument) in harmony.iter().enumerate().skip(parts.len()) {
            let part = &parts[i % parts.len()];
            push(instrument, Role::Harmony, part.name(), &part.notes);
        }
    }

    for &instrument in &assignment.bass {
        push(instrument, Role::Bass, "bass", &outputs.bass);
    }
    for &instrument in &assignment.percussion {
        push(instrument, Role::Percussion, "drums", &outputs.percussion);
    }

    StageOutcome::from_parts(tracks, diagnostics)
}
