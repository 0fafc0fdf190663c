use alloc::vec::Vec;

use crate::tags::{self, Namespace, Tag};
use crate::value::{ContainerBuilder, Value};

/// Requests reading `tags`
///
/// Battery tags only exist per battery, so they are asked for inside a
/// single `BAT_REQ_DATA` container addressing battery 0. Everything else is
/// requested with an empty (`None` typed) value.
pub fn read_request(tags: &[Tag]) -> Vec<Value> {
    let mut requests = Vec::with_capacity(tags.len());
    let mut battery = ContainerBuilder::new(tags::BAT_REQ_DATA);
    battery.append(tags::BAT_INDEX, 0u16);
    let mut battery_used = false;
    for tag in tags.iter().map(|tag| tag.request()) {
        if tag.namespace() == Namespace::BAT && tag != tags::BAT_REQ_DATA {
            battery.append_value(Value::request(tag));
            battery_used = true;
        } else {
            requests.push(Value::request(tag));
        }
    }
    if battery_used {
        requests.push(battery.build());
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Payload;

    #[test]
    fn test_plain_tags() {
        let requests = read_request(&[tags::EMS_REQ_POWER_PV, tags::EMS_POWER_GRID]);
        assert_eq!(
            requests,
            vec![
                Value::request(tags::EMS_REQ_POWER_PV),
                Value::request(tags::EMS_REQ_POWER_GRID)
            ]
        );
        assert_eq!(requests[0].payload, Payload::None);
    }
    #[test]
    fn test_battery_tags_are_wrapped() {
        let requests = read_request(&[tags::BAT_REQ_RSOC, tags::EMS_REQ_BAT_SOC, tags::BAT_REQ_CURRENT]);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].tag, tags::EMS_REQ_BAT_SOC);
        let battery = &requests[1];
        assert_eq!(battery.tag, tags::BAT_REQ_DATA);
        let children = battery.children().unwrap();
        assert_eq!(children[0], Value::new(tags::BAT_INDEX, 0u16));
        assert_eq!(children[1].tag, tags::BAT_REQ_RSOC);
        assert_eq!(children[2].tag, tags::BAT_REQ_CURRENT);
    }
}
