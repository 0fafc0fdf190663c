//! Decides what to send next and what a response means
//!
//! The orchestrator is a pure state machine: it never touches the
//! transport. [Orchestrator::next_request] builds the root container for
//! the current state, [Orchestrator::handle_frame] feeds a decoded response
//! back in.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;

use log::{debug, info, warn};

use crate::ProtocolError;
use crate::commands::{
    Credentials, HistoryWindow, PageAnswer, PageStep, Pagination, PowerMode,
    get_power_settings_request, manual_charge_request, read_request,
};
use crate::dictionary::TagDictionary;
use crate::frame::Frame;
use crate::tags::{self, Tag};
use crate::types::WattHours;
use crate::value::{ContainerBuilder, ErrorCode, Payload, Value};

/// One unit of work for the session
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Read the given tags once
    ReadTags(Vec<Tag>),
    /// Battery scalars followed by every battery module
    ModuleDump,
    /// Read the current power limits
    GetPowerSettings,
    /// Change the power limits
    PowerSettings(PowerMode),
    /// Charge the given energy from the grid
    ManualCharge(WattHours),
    History(HistoryWindow),
}

/// Meaning of a tag in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Authentication,
    BatteryData,
    BatteryIndex,
    DcbCount,
    DcbInfo,
    DcbCells,
    DcbIndex,
    PowerSettings,
    ManualCharge,
    History,
    HistorySum,
    HistoryValues,
    GraphIndex,
    Other(Tag),
}

impl From<Tag> for Response {
    fn from(tag: Tag) -> Self {
        match tag.request() {
            tags::RSCP_REQ_AUTHENTICATION => Response::Authentication,
            tags::BAT_REQ_DATA => Response::BatteryData,
            tags::BAT_INDEX => Response::BatteryIndex,
            tags::BAT_REQ_DCB_COUNT => Response::DcbCount,
            tags::BAT_REQ_DCB_INFO => Response::DcbInfo,
            tags::BAT_REQ_DCB_ALL_CELL_VOLTAGES | tags::BAT_REQ_DCB_ALL_CELL_TEMPERATURES => {
                Response::DcbCells
            }
            tags::BAT_DCB_INDEX => Response::DcbIndex,
            tags::EMS_REQ_GET_POWER_SETTINGS | tags::EMS_REQ_SET_POWER_SETTINGS => {
                Response::PowerSettings
            }
            tags::EMS_REQ_START_MANUAL_CHARGE => Response::ManualCharge,
            tags::DB_REQ_HISTORY_DATA_DAY
            | tags::DB_REQ_HISTORY_DATA_WEEK
            | tags::DB_REQ_HISTORY_DATA_MONTH
            | tags::DB_REQ_HISTORY_DATA_YEAR => Response::History,
            tags::DB_SUM_CONTAINER => Response::HistorySum,
            tags::DB_VALUE_CONTAINER => Response::HistoryValues,
            tags::DB_GRAPH_INDEX => Response::GraphIndex,
            other => Response::Other(other),
        }
    }
}

impl Response {
    /// Entries of these containers belong to an index marker
    pub fn is_grouped(&self) -> bool {
        matches!(
            self,
            Response::BatteryData
                | Response::DcbInfo
                | Response::DcbCells
                | Response::HistoryValues
        )
    }
    pub fn is_index(&self) -> bool {
        matches!(
            self,
            Response::BatteryIndex | Response::DcbIndex | Response::GraphIndex
        )
    }
    fn is_module_data(&self) -> bool {
        matches!(self, Response::DcbInfo | Response::DcbCells)
    }
}

/// Something a response tree said
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Access level granted
    Authenticated(u8),
    DcbCount(u16),
    /// Data of the module with this index arrived
    DcbData(Option<u32>),
    Reading {
        tag: Tag,
        value: Payload,
        index: Option<u32>,
    },
    DeviceError {
        tag: Tag,
        code: ErrorCode,
    },
}

/// Walk a decoded response tree
///
/// `index` is the most recent index marker of the enclosing containers.
/// Inside `grouped` containers entries are only kept once some index is
/// known. Error typed values end their sub-tree but not their siblings.
pub fn dispatch(values: &[Value], index: Option<u32>, grouped: bool, events: &mut Vec<Event>) {
    let mut current = index;
    for value in values {
        let response = Response::from(value.tag);
        if let Some(code) = value.error_code() {
            warn!("Tag {} answered with device error {code}", value.tag);
            events.push(Event::DeviceError {
                tag: value.tag,
                code,
            });
            continue;
        }
        if response.is_index() {
            match index_of(value) {
                Some(i) => current = Some(i),
                None => warn!("Ignoring index marker {:?}", value.payload),
            }
            continue;
        }
        if grouped && current.is_none() {
            warn!("Dropping {} received before an index marker", value.tag);
            continue;
        }

        match response {
            Response::Authentication => match value.as_u64() {
                Ok(level) => events.push(Event::Authenticated(
                    u8::try_from(level).unwrap_or(u8::MAX),
                )),
                Err(e) => warn!("Unexpected authentication answer: {e}"),
            },
            Response::DcbCount => {
                match value.as_u64() {
                    Ok(count) => match u16::try_from(count) {
                        Ok(count) => events.push(Event::DcbCount(count)),
                        Err(_) => warn!("Module count {count} out of range"),
                    },
                    Err(e) => warn!("Unexpected module count: {e}"),
                }
                events.push(reading(value, current));
            }
            _ => match &value.payload {
                Payload::Container(children) => {
                    dispatch(children, current, response.is_grouped(), events);
                    if response.is_module_data() {
                        let module = value.find(tags::BAT_DCB_INDEX).and_then(index_of);
                        events.push(Event::DcbData(module));
                    }
                }
                _ => events.push(reading(value, current)),
            },
        }
    }
}

/// Index markers are integers, history slots number theirs with floats
fn index_of(value: &Value) -> Option<u32> {
    if let Ok(i) = value.as_u64() {
        return u32::try_from(i).ok();
    }
    let f = value.as_f64().ok()?;
    let i = f as u32;
    (f >= 0.0 && i as f64 == f).then_some(i)
}

fn reading(value: &Value, index: Option<u32>) -> Event {
    Event::Reading {
        tag: value.tag,
        value: value.payload.clone(),
        index,
    }
}

/// A value reported to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub tag: Tag,
    pub value: Payload,
    /// Battery, module or history slot the value belongs to
    pub index: Option<u32>,
    pub interpretation: Option<String>,
}

/// Result of handling a response
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Reading(Reading),
    DeviceError { tag: Tag, code: ErrorCode },
}

/// Request/response state of one session
#[derive(Debug)]
pub struct Orchestrator {
    credentials: Credentials,
    authenticated: bool,
    queries: VecDeque<Query>,
    pagination: Pagination,
}

impl Orchestrator {
    pub fn new(credentials: Credentials, queries: impl IntoIterator<Item = Query>) -> Self {
        Orchestrator {
            credentials,
            authenticated: false,
            queries: queries.into_iter().collect(),
            pagination: Pagination::default(),
        }
    }

    /// Queue another query after the pending ones
    pub fn push(&mut self, query: Query) {
        self.queries.push_back(query);
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Authenticated and nothing left to ask
    pub fn is_finished(&self) -> bool {
        self.authenticated && self.queries.is_empty()
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// Root container of the next request
    ///
    /// Calling this again without handling a response returns the same
    /// request, which is what a retry after a timeout sends.
    pub fn next_request(&self) -> Option<Value> {
        let mut root = ContainerBuilder::new(Tag::ROOT);
        if !self.authenticated {
            root.append_value(self.credentials.request());
            return Some(root.build());
        }
        match self.queries.front()? {
            Query::ReadTags(tags) => {
                for request in read_request(tags) {
                    root.append_value(request);
                }
            }
            Query::ModuleDump => {
                root.append_value(self.pagination.request());
            }
            Query::GetPowerSettings => {
                root.append_value(get_power_settings_request());
            }
            Query::PowerSettings(mode) => {
                root.append_value(mode.request());
            }
            Query::ManualCharge(energy) => {
                root.append_value(manual_charge_request(*energy));
            }
            Query::History(window) => {
                root.append_value(window.request());
            }
        }
        Some(root.build())
    }

    /// Apply a response frame
    pub fn handle_frame(
        &mut self,
        frame: &Frame,
        dictionary: &dyn TagDictionary,
    ) -> Result<Vec<Output>, ProtocolError> {
        let mut events = Vec::new();
        dispatch(&frame.values, None, false, &mut events);

        if !self.authenticated {
            let level = events.iter().find_map(|event| match event {
                Event::Authenticated(level) => Some(*level),
                _ => None,
            });
            return match level {
                Some(level) if level > 0 => {
                    info!("Authenticated with access level {level}");
                    self.authenticated = true;
                    Ok(Vec::new())
                }
                _ => Err(ProtocolError::AuthenticationRejected),
            };
        }

        let done = match self.queries.front() {
            Some(Query::ModuleDump) => self.step_pagination(&events) == PageStep::Done,
            Some(_) => true,
            None => {
                warn!("Response without a pending query");
                false
            }
        };
        if done {
            if let Some(query) = self.queries.pop_front() {
                debug!("Completed {query:?}");
            }
        }

        Ok(events
            .into_iter()
            .filter_map(|event| match event {
                Event::Reading { tag, value, index } => Some(Output::Reading(Reading {
                    interpretation: dictionary.interpret(tag, &value),
                    tag,
                    value,
                    index,
                })),
                Event::DeviceError { tag, code } => Some(Output::DeviceError { tag, code }),
                _ => None,
            })
            .collect())
    }

    fn step_pagination(&mut self, events: &[Event]) -> PageStep {
        if self.pagination.first_request {
            let count = events.iter().find_map(|event| match event {
                Event::DcbCount(count) => Some(*count),
                _ => None,
            });
            return self.pagination.start(count);
        }
        self.pagination.advance(page_answer(events))
    }
}

/// Module data wins over errors. An error on a module container answers
/// that module, any other error refuses the whole request.
fn page_answer(events: &[Event]) -> PageAnswer {
    let mut answer = PageAnswer::Nothing;
    for event in events {
        match event {
            Event::DcbData(Some(index)) => return PageAnswer::Module(Some(*index)),
            Event::DcbData(None) => answer = PageAnswer::Module(None),
            Event::DeviceError { tag, .. } if Response::from(*tag).is_module_data() => {
                answer = PageAnswer::Module(None);
            }
            Event::DeviceError { .. } if answer == PageAnswer::Nothing => {
                answer = PageAnswer::Failed;
            }
            _ => {}
        }
    }
    answer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MAX_UNANSWERED;
    use crate::dictionary::BuiltinDictionary;
    use crate::types::Watt;
    use crate::value::Timestamp;
    use alloc::vec;

    fn orchestrator(queries: Vec<Query>) -> Orchestrator {
        Orchestrator::new(Credentials::new("user", "secret"), queries)
    }

    fn response(values: Vec<Value>) -> Frame {
        Frame::new(Timestamp::from_seconds(1_700_000_000), values)
    }

    fn authenticate(orchestrator: &mut Orchestrator) {
        let frame = response(vec![Value::new(tags::RSCP_AUTHENTICATION, 10u8)]);
        assert_eq!(orchestrator.handle_frame(&frame, &BuiltinDictionary), Ok(vec![]));
        assert!(orchestrator.is_authenticated());
    }

    fn top_level(request: &Value) -> &[Value] {
        assert_eq!(request.tag, Tag::ROOT);
        request.children().unwrap()
    }

    #[test]
    fn test_authentication_first() {
        let orchestrator = orchestrator(vec![Query::ReadTags(vec![tags::EMS_REQ_POWER_PV])]);
        let request = orchestrator.next_request().unwrap();
        let values = top_level(&request);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].tag, tags::RSCP_REQ_AUTHENTICATION);
        assert_eq!(
            values[0].find(tags::RSCP_AUTHENTICATION_USER).map(|v| v.as_str()),
            Some(Ok("user"))
        );
        // Idempotent until a response is handled
        assert_eq!(orchestrator.next_request(), Some(request));
    }

    #[test]
    fn test_access_level_zero_is_rejected() {
        let mut orchestrator = orchestrator(vec![]);
        let frame = response(vec![Value::new(tags::RSCP_AUTHENTICATION, 0u8)]);
        assert_eq!(
            orchestrator.handle_frame(&frame, &BuiltinDictionary),
            Err(ProtocolError::AuthenticationRejected)
        );
        let frame = response(vec![Value::new(tags::RSCP_AUTHENTICATION, ErrorCode::AccessDenied)]);
        assert_eq!(
            orchestrator.handle_frame(&frame, &BuiltinDictionary),
            Err(ProtocolError::AuthenticationRejected)
        );
        assert!(!orchestrator.is_authenticated());
    }

    #[test]
    fn test_read_tags() {
        let mut orchestrator = orchestrator(vec![Query::ReadTags(vec![
            tags::EMS_REQ_POWER_GRID,
            tags::BAT_REQ_RSOC,
        ])]);
        authenticate(&mut orchestrator);
        let request = orchestrator.next_request().unwrap();
        let values = top_level(&request);
        assert_eq!(values[0], Value::request(tags::EMS_REQ_POWER_GRID));
        assert_eq!(values[1].tag, tags::BAT_REQ_DATA);

        let mut bat = ContainerBuilder::new(tags::BAT_DATA);
        bat.append(tags::BAT_INDEX, 0u16).append(tags::BAT_RSOC, 64.5f32);
        let frame = response(vec![Value::new(tags::EMS_POWER_GRID, -420i32), bat.build()]);
        let outputs = orchestrator.handle_frame(&frame, &BuiltinDictionary).unwrap();
        assert_eq!(
            outputs,
            vec![
                Output::Reading(Reading {
                    tag: tags::EMS_POWER_GRID,
                    value: Payload::Int32(-420),
                    index: None,
                    interpretation: Some("export".into()),
                }),
                Output::Reading(Reading {
                    tag: tags::BAT_RSOC,
                    value: Payload::Float32(64.5),
                    index: Some(0),
                    interpretation: None,
                }),
            ]
        );
        assert!(orchestrator.is_finished());
        assert_eq!(orchestrator.next_request(), None);
    }

    #[test]
    fn test_device_error_is_isolated() {
        let mut events = Vec::new();
        let mut container = ContainerBuilder::new(tags::EMS_GET_POWER_SETTINGS);
        container
            .append(tags::EMS_MAX_CHARGE_POWER, 3000u32)
            .append(tags::EMS_MAX_DISCHARGE_POWER, ErrorCode::AccessDenied)
            .append(tags::EMS_POWERSAVE_ENABLED, true);
        dispatch(
            &[
                Value::new(tags::EMS_POWER_PV, ErrorCode::NotAvailable),
                container.build(),
            ],
            None,
            false,
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::DeviceError {
                    tag: tags::EMS_POWER_PV,
                    code: ErrorCode::NotAvailable
                },
                Event::Reading {
                    tag: tags::EMS_MAX_CHARGE_POWER,
                    value: Payload::UInt32(3000),
                    index: None
                },
                Event::DeviceError {
                    tag: tags::EMS_MAX_DISCHARGE_POWER,
                    code: ErrorCode::AccessDenied
                },
                Event::Reading {
                    tag: tags::EMS_POWERSAVE_ENABLED,
                    value: Payload::Bool(true),
                    index: None
                },
            ]
        );
    }

    #[test]
    fn test_grouped_entries_need_a_marker() {
        let mut slot = ContainerBuilder::new(tags::DB_VALUE_CONTAINER);
        slot.append(tags::DB_BAT_POWER_IN, 10.0f32)
            .append(tags::DB_GRAPH_INDEX, true)
            .append(tags::DB_GRAPH_INDEX, 4.0f32)
            .append(tags::DB_BAT_POWER_OUT, 20.0f32);
        let mut events = Vec::new();
        dispatch(&[slot.build()], None, false, &mut events);
        assert_eq!(
            events,
            vec![Event::Reading {
                tag: tags::DB_BAT_POWER_OUT,
                value: Payload::Float32(20.0),
                index: Some(4)
            }]
        );
    }

    #[test]
    fn test_nested_containers_inherit_index() {
        let mut cells = ContainerBuilder::new(tags::BAT_DATA);
        cells
            .append(tags::BAT_DCB_VOLTAGE, 3.3f32)
            .append(tags::BAT_DCB_VOLTAGE, 3.4f32);
        let mut voltages = ContainerBuilder::new(tags::BAT_DCB_ALL_CELL_VOLTAGES);
        voltages
            .append(tags::BAT_DCB_INDEX, 1u16)
            .append_value(cells.build());
        let mut events = Vec::new();
        dispatch(&[voltages.build()], Some(0), true, &mut events);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], Event::Reading { index: Some(1), .. }));
        assert!(matches!(events[1], Event::Reading { index: Some(1), .. }));
        assert_eq!(events[2], Event::DcbData(Some(1)));
    }

    fn module_response(index: u16) -> Frame {
        let mut info = ContainerBuilder::new(tags::BAT_DCB_INFO);
        info.append(tags::BAT_DCB_INDEX, index)
            .append(tags::BAT_DCB_SOC, 70.0f32);
        let mut bat = ContainerBuilder::new(tags::BAT_DATA);
        bat.append(tags::BAT_INDEX, 0u16).append_value(info.build());
        response(vec![bat.build()])
    }

    fn count_response(count: u8) -> Frame {
        let mut bat = ContainerBuilder::new(tags::BAT_DATA);
        bat.append(tags::BAT_INDEX, 0u16)
            .append(tags::BAT_RSOC, 55.0f32)
            .append(tags::BAT_DCB_COUNT, count);
        response(vec![bat.build()])
    }

    #[test]
    fn test_module_dump_pages_through_modules() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump]);
        authenticate(&mut orchestrator);

        let mut requests = 0;
        let first = orchestrator.next_request().unwrap();
        requests += 1;
        assert!(top_level(&first)[0].find(tags::BAT_REQ_DCB_COUNT).is_some());
        orchestrator
            .handle_frame(&count_response(3), &BuiltinDictionary)
            .unwrap();
        assert_eq!(orchestrator.pagination().total, 3);

        for index in 0..3u16 {
            let request = orchestrator.next_request().unwrap();
            requests += 1;
            assert_eq!(
                top_level(&request)[0].find(tags::BAT_REQ_DCB_INFO),
                Some(&Value::new(tags::BAT_REQ_DCB_INFO, index))
            );
            let outputs = orchestrator
                .handle_frame(&module_response(index), &BuiltinDictionary)
                .unwrap();
            assert_eq!(
                outputs,
                vec![Output::Reading(Reading {
                    tag: tags::BAT_DCB_SOC,
                    value: Payload::Float32(70.0),
                    index: Some(index as u32),
                    interpretation: None,
                })]
            );
        }
        assert_eq!(requests, 4);
        assert!(orchestrator.is_finished());
        assert_eq!(*orchestrator.pagination(), Pagination::default());
    }

    #[test]
    fn test_module_dump_without_modules() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump, Query::GetPowerSettings]);
        authenticate(&mut orchestrator);
        orchestrator
            .handle_frame(&count_response(0), &BuiltinDictionary)
            .unwrap();
        let request = orchestrator.next_request().unwrap();
        assert_eq!(
            top_level(&request),
            &[Value::request(tags::EMS_REQ_GET_POWER_SETTINGS)]
        );
    }

    #[test]
    fn test_refused_battery_request_ends_module_dump() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump, Query::GetPowerSettings]);
        authenticate(&mut orchestrator);
        orchestrator
            .handle_frame(&count_response(2), &BuiltinDictionary)
            .unwrap();

        let refused = response(vec![Value::new(tags::BAT_DATA, ErrorCode::AccessDenied)]);
        let outputs = orchestrator
            .handle_frame(&refused, &BuiltinDictionary)
            .unwrap();
        assert_eq!(
            outputs,
            vec![Output::DeviceError {
                tag: tags::BAT_DATA,
                code: ErrorCode::AccessDenied
            }]
        );
        assert_eq!(*orchestrator.pagination(), Pagination::default());
        assert_eq!(
            top_level(&orchestrator.next_request().unwrap()),
            &[Value::request(tags::EMS_REQ_GET_POWER_SETTINGS)]
        );
    }

    #[test]
    fn test_module_error_moves_to_next_module() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump]);
        authenticate(&mut orchestrator);
        orchestrator
            .handle_frame(&count_response(2), &BuiltinDictionary)
            .unwrap();

        let mut bat = ContainerBuilder::new(tags::BAT_DATA);
        bat.append(tags::BAT_INDEX, 0u16)
            .append(tags::BAT_DCB_INFO, ErrorCode::NotAvailable);
        orchestrator
            .handle_frame(&response(vec![bat.build()]), &BuiltinDictionary)
            .unwrap();
        assert_eq!(orchestrator.pagination().cursor, 1);
    }

    #[test]
    fn test_repeated_module_answer_is_not_counted_twice() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump]);
        authenticate(&mut orchestrator);
        orchestrator
            .handle_frame(&count_response(3), &BuiltinDictionary)
            .unwrap();

        orchestrator
            .handle_frame(&module_response(0), &BuiltinDictionary)
            .unwrap();
        orchestrator
            .handle_frame(&module_response(0), &BuiltinDictionary)
            .unwrap();
        assert_eq!(orchestrator.pagination().cursor, 1);
        assert_eq!(
            top_level(&orchestrator.next_request().unwrap())[0].find(tags::BAT_REQ_DCB_INFO),
            Some(&Value::new(tags::BAT_REQ_DCB_INFO, 1u16))
        );
        for index in 1..3 {
            orchestrator
                .handle_frame(&module_response(index), &BuiltinDictionary)
                .unwrap();
        }
        assert!(orchestrator.is_finished());
    }

    #[test]
    fn test_silent_module_dump_gives_up() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump]);
        authenticate(&mut orchestrator);
        orchestrator
            .handle_frame(&count_response(2), &BuiltinDictionary)
            .unwrap();

        let empty = response(vec![Value::new(tags::BAT_DATA, Payload::Container(vec![]))]);
        for _ in 0..MAX_UNANSWERED {
            orchestrator.handle_frame(&empty, &BuiltinDictionary).unwrap();
            assert!(!orchestrator.is_finished());
        }
        orchestrator.handle_frame(&empty, &BuiltinDictionary).unwrap();
        assert!(orchestrator.is_finished());
    }

    #[test]
    fn test_module_count_out_of_range() {
        let mut orchestrator = orchestrator(vec![Query::ModuleDump]);
        authenticate(&mut orchestrator);
        let mut bat = ContainerBuilder::new(tags::BAT_DATA);
        bat.append(tags::BAT_INDEX, 0u16)
            .append(tags::BAT_DCB_COUNT, 70_000u32);
        orchestrator
            .handle_frame(&response(vec![bat.build()]), &BuiltinDictionary)
            .unwrap();
        assert!(orchestrator.is_finished());
        assert_eq!(*orchestrator.pagination(), Pagination::default());
    }

    #[test]
    fn test_power_settings_request() {
        let mode = PowerMode::Manual {
            charge: Watt(1000),
            discharge: Watt(2000),
        };
        let mut orchestrator = orchestrator(vec![
            Query::PowerSettings(mode),
            Query::ManualCharge(WattHours(500)),
        ]);
        authenticate(&mut orchestrator);
        let request = orchestrator.next_request().unwrap();
        assert_eq!(top_level(&request), &[mode.request()]);

        let mut answer = ContainerBuilder::new(tags::EMS_SET_POWER_SETTINGS);
        answer.append(tags::EMS_MAX_CHARGE_POWER, 0i8);
        orchestrator
            .handle_frame(&response(vec![answer.build()]), &BuiltinDictionary)
            .unwrap();
        let request = orchestrator.next_request().unwrap();
        assert_eq!(
            top_level(&request),
            &[Value::new(tags::EMS_REQ_START_MANUAL_CHARGE, 500u32)]
        );
    }
}
