use log::{debug, warn};

use crate::tags;
use crate::value::{ContainerBuilder, Value};

/// Responses in a row that don't answer the current module before the
/// dump is abandoned
pub const MAX_UNANSWERED: u8 = 3;

/// Progress through the battery modules (DCBs)
///
/// The first request asks for the battery scalars and the number of
/// modules. Each module is then requested on its own, `total + 1`
/// requests in all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub first_request: bool,
    pub cursor: u16,
    pub total: u16,
    /// Responses since the cursor last moved
    pub unanswered: u8,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            first_request: true,
            cursor: 0,
            total: 0,
            unanswered: 0,
        }
    }
}

/// What the response to an indexed request carried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAnswer {
    /// Data for the given module, `None` if it didn't say which
    Module(Option<u32>),
    /// The device refused the battery request as a whole
    Failed,
    /// Neither module data nor an error
    Nothing,
}

/// What a response did to the pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStep {
    /// Another request is due
    Continue,
    /// All modules are done
    Done,
}

impl Pagination {
    /// Request for the current page
    pub fn request(&self) -> Value {
        let mut data = ContainerBuilder::new(tags::BAT_REQ_DATA);
        data.append(tags::BAT_INDEX, 0u16);
        if self.first_request {
            for tag in [
                tags::BAT_REQ_RSOC,
                tags::BAT_REQ_MODULE_VOLTAGE,
                tags::BAT_REQ_CURRENT,
                tags::BAT_REQ_STATUS_CODE,
                tags::BAT_REQ_ERROR_CODE,
                tags::BAT_REQ_DCB_COUNT,
            ] {
                data.append_value(Value::request(tag));
            }
        } else {
            data.append(tags::BAT_REQ_DCB_INFO, self.cursor)
                .append(tags::BAT_REQ_DCB_ALL_CELL_VOLTAGES, self.cursor)
                .append(tags::BAT_REQ_DCB_ALL_CELL_TEMPERATURES, self.cursor);
        }
        data.build()
    }

    /// The first response reported `count` modules
    ///
    /// `None` means the device didn't say and is treated like zero.
    pub fn start(&mut self, count: Option<u16>) -> PageStep {
        match count {
            Some(total) if total > 0 => {
                debug!("Paging through {total} battery modules");
                *self = Pagination {
                    first_request: false,
                    total,
                    ..Pagination::default()
                };
                PageStep::Continue
            }
            other => {
                if other.is_none() {
                    warn!("Battery data carried no module count");
                }
                *self = Pagination::default();
                PageStep::Done
            }
        }
    }

    /// An indexed response arrived
    ///
    /// Only data for the module under the cursor moves it on. Data for
    /// another module is a late answer to an earlier request and is
    /// ignored, as are responses without any module data. After
    /// [MAX_UNANSWERED] of those in a row, or a refused request, the dump
    /// ends.
    pub fn advance(&mut self, answer: PageAnswer) -> PageStep {
        match answer {
            PageAnswer::Module(Some(index)) if index != u32::from(self.cursor) => {
                warn!("Ignoring data for module {index}, waiting for {}", self.cursor);
                self.unanswered += 1;
            }
            PageAnswer::Module(_) => {
                self.cursor += 1;
                self.unanswered = 0;
            }
            PageAnswer::Failed => {
                warn!("Battery request for module {} refused, ending the dump", self.cursor);
                *self = Pagination::default();
                return PageStep::Done;
            }
            PageAnswer::Nothing => {
                warn!("No module data for index {}, asking again", self.cursor);
                self.unanswered += 1;
            }
        }
        if self.unanswered > MAX_UNANSWERED {
            warn!("Module {} never answered, ending the dump", self.cursor);
            *self = Pagination::default();
            PageStep::Done
        } else if self.cursor >= self.total {
            *self = Pagination::default();
            PageStep::Done
        } else {
            PageStep::Continue
        }
    }
}
