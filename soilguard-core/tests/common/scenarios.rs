//! Ready-made channels and nodes

use soilguard_core::{
    time::MockTimeSource, Channel, ChannelConfig, Node, NodeConfig, PowerController,
};

use super::hal::{ClockDelay, ProbeInput, RecordingPin, VecSink};

pub type TestChannel = Channel<ProbeInput, RecordingPin>;
pub type TestNode<'a> =
    Node<ProbeInput, RecordingPin, ClockDelay<'a>, &'a MockTimeSource, &'a mut VecSink>;

/// Always-on probe on `A<pin>` with default settings
pub fn always_on(pin: u8, probe: &ProbeInput) -> TestChannel {
    Channel::new(
        ChannelConfig::new(pin),
        probe.clone(),
        PowerController::always_on(),
    )
    .unwrap()
}

/// Probe on `A<pin>` powered from `D<power_pin>`
pub fn switched(
    pin: u8,
    power_pin: u8,
    probe: &ProbeInput,
    power: &RecordingPin,
) -> TestChannel {
    Channel::new(
        ChannelConfig::new(pin).with_power_pin(power_pin),
        probe.clone(),
        PowerController::switched_default(power.clone()).unwrap(),
    )
    .unwrap()
}

/// Node config without banner, for tests that only look at cycle output
pub fn quiet() -> NodeConfig {
    NodeConfig {
        banner: false,
        ..NodeConfig::default()
    }
}

/// Node on a mock clock writing into `sink`
pub fn node<'a>(
    config: NodeConfig,
    clock: &'a MockTimeSource,
    sink: &'a mut VecSink,
    channels: Vec<TestChannel>,
) -> TestNode<'a> {
    let mut node = Node::new(config, ClockDelay::new(clock), clock, sink).unwrap();
    for channel in channels {
        node.add_channel(channel).unwrap();
    }
    node
}
