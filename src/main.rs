//! Carrom Demo
//!
//! Runs a full local match end-to-end: the south seat acts directly on
//! the authoritative state, the north seat goes through the network
//! projection (intents in, snapshots out) as a remote player would.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use carrom::{
    core::vec2::Vec2,
    game::{
        events::GameEventData,
        input::{apply_action, PlayerAction},
        state::{MatchSetup, MatchState, PlayerId, PlayerSpec},
        tick::run_until_settled,
    },
    network::{
        protocol::{ClientIntent, IntentKind},
        sync::{IntentDisposition, IntentGate, Mirror, SnapshotProducer},
    },
    PieceId, Seat, StrikerPhase, TICK_RATE, VERSION,
};

/// Strikes before the demo gives up on a decisive finish.
const MAX_STRIKES: u32 = 60;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Carrom Core v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_match()
}

/// Pick a drag that launches the striker at the nearest interesting
/// target: the queen while it is up, otherwise the shooter's closest
/// remaining piece.
fn pick_drag(state: &MatchState, seat: Seat) -> Vec2 {
    let striker = state.striker().position;
    let target = if state.queen().is_active() {
        state.queen().position
    } else {
        state
            .pieces
            .iter()
            .filter(|p| p.kind == seat.own_color() && p.is_active())
            .min_by(|a, b| {
                a.position
                    .distance_squared(striker)
                    .total_cmp(&b.position.distance_squared(striker))
            })
            .map(|p| p.position)
            .unwrap_or(Vec2::ZERO)
    };

    // Pull back opposite the launch direction, hard enough to matter.
    (striker - target).normalize().scale(18.0)
}

fn demo_match() -> Result<()> {
    let setup = MatchSetup {
        match_id: *uuid::Uuid::new_v4().as_bytes(),
        players: [
            PlayerSpec {
                id: PlayerId::random(),
                name: "host".into(),
                is_bot: false,
            },
            PlayerSpec {
                id: PlayerId::random(),
                name: "guest".into(),
                is_bot: true,
            },
        ],
    };

    let mut state = MatchState::new(setup);
    let mut gate = IntentGate::new();
    let mut producer = SnapshotProducer::new();
    let mut mirror = Mirror::new();
    let mut intent_seq = 0u32;

    info!("match {}", hex::encode(state.match_id));

    for strike in 0..MAX_STRIKES {
        if state.is_ended() {
            break;
        }

        let seat = state.turn.current;
        let place_x = (strike as f32 * 3.7).sin() * 15.0;
        let drag = pick_drag(&state, seat);

        match seat {
            // The host seat acts on the authority directly.
            Seat::South => {
                apply_action(&mut state, seat, PlayerAction::Place {
                    piece: PieceId::STRIKER,
                    x: place_x,
                })?;
                apply_action(&mut state, seat, PlayerAction::Aim { drag })?;
                if state.turn.striker_phase != StrikerPhase::Aiming {
                    info!(strike, "drag too shallow, strike skipped");
                    continue;
                }
                apply_action(&mut state, seat, PlayerAction::Release)?;
            }
            // The guest seat speaks the wire protocol.
            Seat::North => {
                for kind in [
                    IntentKind::Place { piece: 0, x: place_x },
                    IntentKind::Aim { drag: [drag.x, drag.y] },
                    IntentKind::Release,
                ] {
                    intent_seq += 1;
                    let intent = ClientIntent { seat: 1, seq: intent_seq, kind };
                    let disposition = gate.admit(&mut state, &intent);
                    if disposition != IntentDisposition::Applied {
                        info!(?disposition, "guest intent not applied");
                    }
                }
            }
        }

        let result = run_until_settled(&mut state, 10_000);

        for event in &result.events {
            match &event.data {
                GameEventData::PieceCaptured { kind, .. } => {
                    info!(strike, ?seat, "captured {:?}", kind);
                }
                GameEventData::QueenPocketed { by_seat } => {
                    info!(strike, "queen pocketed by {:?}, cover pending", by_seat);
                }
                GameEventData::QueenCovered { by_seat } => {
                    info!(strike, "queen covered by {:?}", by_seat);
                }
                GameEventData::QueenReturned => {
                    info!(strike, "queen returned to the board");
                }
                GameEventData::Foul { seat, kind, returned } => {
                    info!(strike, ?seat, ?kind, returned = returned.len(), "foul");
                }
                GameEventData::MatchEnded { winner } => {
                    info!(strike, "match ended, winner {:?}", winner);
                }
                _ => {}
            }
        }

        // Broadcast the settled turn to the guest's mirror.
        let snapshot = producer.produce(&state);
        mirror.apply(snapshot);
    }

    info!("=== Match Results ===");
    for player in &state.players {
        info!(
            "{} ({:?}): score {}",
            player.name, player.seat, player.score
        );
    }
    info!("final state hash: {}", hex::encode(state.compute_hash()));
    if let Some(snapshot) = mirror.latest() {
        info!(
            "mirror holds snapshot seq {} at tick {} ({} gaps observed)",
            snapshot.seq,
            snapshot.tick,
            mirror.gaps_observed()
        );
    }

    Ok(())
}
