use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use fedgate::{
    ActorId, ActorStore, DeadReckoningComponent, DeadReckoningHelper, FlatGround, GatewayError,
    HlaGateway, LoopbackRti, MappingConfig, Message, MessageType,
};

use crate::config::BridgeConfig;
use crate::events::BridgeEvent;
use crate::rpr::tank_type;
use crate::simulation::ScriptedVehicle;

type Federate = HlaGateway<LoopbackRti, ActorStore>;

const PUBLISHER_INDEX: u32 = 0;
const OBSERVER_INDEX: u32 = 1;
const OBSERVER_FIRST_ACTOR: u64 = 1000;

/// Two gateways on one loopback federation. The publisher owns a scripted
/// vehicle; the observer discovers it and dead reckons its copy.
pub struct Bridge {
    config: BridgeConfig,
    publisher: Federate,
    observer: Federate,
    dead_reckoning: DeadReckoningComponent,
    vehicle: ScriptedVehicle,
    remote_vehicle: Option<ActorId>,
    tick: u64,
    sim_time: f64,
    tick_duration: Duration,
    last_tick_time: Instant,
    accumulator: Duration,
    running: Arc<AtomicBool>,
    pending_events: VecDeque<BridgeEvent>,
}

impl Bridge {
    pub fn new(config: BridgeConfig, mappings: MappingConfig) -> Result<Self, GatewayError> {
        let mut publisher = HlaGateway::new(
            LoopbackRti::new(PUBLISHER_INDEX),
            ActorStore::default(),
            config.federate("publisher", config.gateway.application_id),
        );
        let mut observer = HlaGateway::new(
            LoopbackRti::new(OBSERVER_INDEX),
            ActorStore::new(OBSERVER_FIRST_ACTOR),
            config.federate("observer", config.gateway.application_id.wrapping_add(1)),
        );
        publisher.load_mappings(mappings.clone())?;
        observer.load_mappings(mappings)?;
        publisher.join_federation()?;
        observer.join_federation()?;

        let actor = publisher.sink_mut().spawn_local(tank_type());
        let vehicle = ScriptedVehicle::new(
            actor,
            config.vehicle_speed,
            config.vehicle_turn_rate,
            config.turret_rate,
        );

        let mut dead_reckoning = DeadReckoningComponent::new(config.dead_reckoning.clone());
        dead_reckoning.set_terrain(FlatGround {
            height: config.ground_height,
        });

        let tick_duration = Duration::from_secs_f64(1.0 / config.tick_rate.max(1) as f64);

        let mut bridge = Self {
            config,
            publisher,
            observer,
            dead_reckoning,
            vehicle,
            remote_vehicle: None,
            tick: 0,
            sim_time: 0.0,
            tick_duration,
            last_tick_time: Instant::now(),
            accumulator: Duration::ZERO,
            running: Arc::new(AtomicBool::new(true)),
            pending_events: VecDeque::new(),
        };
        bridge.publish_vehicle()?;
        Ok(bridge)
    }

    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn remote_vehicle(&self) -> Option<ActorId> {
        self.remote_vehicle
    }

    pub fn observer(&self) -> &Federate {
        &self.observer
    }

    pub fn vehicle(&self) -> &ScriptedVehicle {
        &self.vehicle
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = BridgeEvent> + '_ {
        self.pending_events.drain(..)
    }

    pub fn tick_once(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_tick_time;
        self.last_tick_time = now;
        self.accumulator += delta;

        while self.accumulator >= self.tick_duration {
            self.accumulator -= self.tick_duration;
            if let Err(e) = self.tick() {
                self.pending_events.push_back(BridgeEvent::Error {
                    message: format!("Tick {} failed: {}", self.tick, e),
                });
            }
        }
    }

    /// Withdraws the vehicle and resigns both federates.
    pub fn shutdown(&mut self) -> Result<(), GatewayError> {
        self.running.store(false, Ordering::SeqCst);
        self.publisher
            .dispatch_network_message(&self.vehicle.deleted_message(self.sim_time))?;
        self.relay();
        self.publisher.leave_federation()?;
        self.observer.leave_federation()?;
        Ok(())
    }

    fn tick(&mut self) -> Result<(), GatewayError> {
        let dt = 1.0 / self.config.tick_rate.max(1) as f32;
        self.tick += 1;
        self.sim_time += f64::from(dt);

        self.vehicle.step(dt);
        if let Some(record) = self.publisher.sink_mut().get_mut(self.vehicle.actor) {
            record.transform = self.vehicle.transform();
        }
        if self.tick % u64::from(self.config.publish_interval.max(1)) == 0 {
            self.publisher
                .dispatch_network_message(&self.vehicle.update_message(self.sim_time))?;
        }

        let tick_local = Message::tick(MessageType::TickLocal, dt, self.sim_time);
        self.publisher.process_message(&tick_local)?;
        self.relay();
        self.observer.process_message(&tick_local)?;

        let tick_remote = Message::tick(MessageType::TickRemote, dt, self.sim_time);
        self.dead_reckoning
            .process_message(&tick_remote, self.observer.sink_mut());

        if let Some(remote) = self.remote_vehicle {
            if let Some(record) = self.observer.sink().get(remote) {
                let distance = record.transform.translation.distance(self.vehicle.position);
                log::trace!("Remote vehicle {} drifts {:.3}", remote, distance);
                if self.tick % u64::from(self.config.tick_rate.max(1)) == 0 {
                    self.pending_events.push_back(BridgeEvent::Drift {
                        actor: remote,
                        distance,
                    });
                }
            }
        }
        Ok(())
    }

    fn publish_vehicle(&mut self) -> Result<(), GatewayError> {
        self.publisher
            .dispatch_network_message(&self.vehicle.created_message(self.sim_time))?;
        let actor = self.vehicle.actor;
        self.pending_events.push_back(BridgeEvent::VehiclePublished {
            actor,
            entity_id: self.publisher.table().get_entity_id(actor),
        });
        self.relay();
        Ok(())
    }

    /// Carries the publisher's federation traffic to the observer and lets
    /// the observer's components react to the resulting messages.
    fn relay(&mut self) {
        let calls = self.publisher.rti_mut().drain_calls();
        for call in &calls {
            call.deliver_to(&mut self.observer);
        }

        for message in self.observer.sink_mut().process_messages() {
            match (&message.message_type, message.about_actor_id) {
                (MessageType::ActorCreated, Some(actor)) => {
                    let mut helper = DeadReckoningHelper::new();
                    helper.set_model_dimensions(self.config.vehicle_dimensions);
                    if let Err(e) =
                        self.dead_reckoning
                            .register_actor(actor, helper, self.observer.sink_mut())
                    {
                        log::warn!("{}", e);
                    }
                    self.remote_vehicle = Some(actor);
                    self.pending_events
                        .push_back(BridgeEvent::RemoteDiscovered { actor });
                }
                (MessageType::ActorDeleted, Some(actor)) => {
                    if self.remote_vehicle == Some(actor) {
                        self.remote_vehicle = None;
                    }
                    self.pending_events
                        .push_back(BridgeEvent::RemoteRemoved { actor });
                }
                _ => {}
            }
            self.dead_reckoning
                .process_message(&message, self.observer.sink_mut());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpr::builtin_mappings;

    fn bridge() -> Bridge {
        Bridge::new(BridgeConfig::default(), builtin_mappings()).unwrap()
    }

    #[test]
    fn observer_discovers_the_vehicle() {
        let mut bridge = bridge();
        let events: Vec<_> = bridge.drain_events().collect();
        assert!(matches!(
            events[0],
            BridgeEvent::VehiclePublished {
                entity_id: Some(_),
                ..
            }
        ));
        assert!(matches!(events[1], BridgeEvent::RemoteDiscovered { .. }));

        let remote = bridge.remote_vehicle().unwrap();
        assert!(bridge.observer().sink().get(remote).unwrap().remote);
        assert!(bridge.dead_reckoning.is_registered(remote));
    }

    #[test]
    fn remote_copy_tracks_the_vehicle() {
        let mut bridge = bridge();
        for _ in 0..90 {
            bridge.tick().unwrap();
        }

        let remote = bridge.remote_vehicle().unwrap();
        let record = bridge.observer().sink().get(remote).unwrap();
        let distance = record.transform.translation.distance(bridge.vehicle().position);
        assert!(distance < 5.0, "remote copy is {distance} away");
        assert!(record.dofs.contains_key("dof_turret_01"));
        assert!(
            bridge
                .drain_events()
                .any(|event| matches!(event, BridgeEvent::Drift { .. }))
        );
    }

    #[test]
    fn shutdown_removes_the_remote_copy() {
        let mut bridge = bridge();
        bridge.tick().unwrap();
        bridge.shutdown().unwrap();

        assert!(bridge.remote_vehicle().is_none());
        assert!(bridge.dead_reckoning.is_empty());
        assert!(!bridge.observer().is_joined());
        assert!(!bridge.running().load(Ordering::SeqCst));
    }
}
