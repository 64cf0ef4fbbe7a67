//! # Built-in Presets
//!
//! Schemas shipped with Meterbook for LoRaWAN gateways and devices. Both
//! include the AWS IoT thing fields, which only become relevant once a
//! meter reaches [`ValidationStage::Staging`].

use meterbook_core::ValidationStage;

use crate::constraint::{Constraint, NumberRule, TextRule};
use crate::item::{Level, MeterType, Preset};

fn text(
    name: &str,
    description: &str,
    min_length: usize,
    max_length: Option<usize>,
    stage: ValidationStage,
) -> Constraint {
    let mut rule = TextRule::new().with_min_length(min_length);
    rule.max_length = max_length;
    Constraint::new(name, rule)
        .with_description(description)
        .at_stage(stage)
}

/// AWS IoT thing registration fields.
pub fn aws_thing_constraints() -> Vec<Constraint> {
    use ValidationStage::Staging;
    vec![
        text("aws.thingTypeName", "AWS ThingTypeName", 5, None, Staging),
        text("aws.thingGroup", "The AWS ThingGroup", 5, None, Staging),
        text("aws.thingId", "AWS ThingId", 5, None, Staging),
        text("aws.thingArn", "AWS ThingARN", 5, None, Staging),
        text(
            "aws.destinationName",
            "AWS Destination Name - Device Routing",
            0,
            Some(0),
            Staging,
        ),
    ]
}

/// LoRaWAN gateway preset.
pub fn lorawan_gateway() -> Preset {
    use ValidationStage::Connection;
    let mut constraints = vec![
        text("name", "The name of the device", 0, Some(75), Connection),
        Constraint::new("communicationInterval", NumberRule::integer().with_min(1.0))
            .with_description("The number of seconds between readings")
            .at_stage(Connection),
        text("pemCert", "Device PEM certificate", 0, Some(16), Connection),
        text("cupsTrust", "The CUPS Trust", 50, Some(80), Connection),
        text("privateKey", "The Device Private Key", 0, Some(16), Connection),
        text("lnsTrust", "The LNS Trust", 0, Some(16), Connection),
        text("lnsUri", "The LNS URI", 50, Some(80), Connection),
        text("cupsUri", "The CUPS URI", 128, None, Connection),
        text("lorawan.devEui", "LoRaWAN Device EUI", 16, Some(16), Connection).required(true),
        text("lorawan.freqBand", "LoRaWAN Frequency Band", 5, None, Connection),
        text("lorawan.awsId", "LoRaWAN Wireless device Id", 3, Some(36), Connection),
    ];
    constraints.extend(aws_thing_constraints());
    Preset::new(MeterType::Lorawan, Level::Gateway, constraints)
}

/// LoRaWAN end-device preset.
pub fn lorawan_device() -> Preset {
    use ValidationStage::Connection;
    let mut constraints = vec![
        text("lorawan.devEui", "LoRaWAN Device EUI", 16, None, Connection),
        text("lorawan.appEui", "LoRaWAN App EUI", 16, None, Connection),
        text("lorawan.appKey", "LoRaWAN App Key", 16, None, Connection),
        text("lorawan.deviceProfileId", "LoRaWAN Device Profile Id", 16, None, Connection),
        text("lorawan.serviceProfileId", "LoRaWAN Service Profile Id", 16, None, Connection),
        text("lorawan.awsId", "LoRaWAN AWS Id", 5, None, Connection),
    ];
    constraints.extend(aws_thing_constraints());
    Preset::new(MeterType::Lorawan, Level::Device, constraints)
}

/// Every built-in preset.
pub fn defaults() -> Vec<Preset> {
    vec![lorawan_gateway(), lorawan_device()]
}
