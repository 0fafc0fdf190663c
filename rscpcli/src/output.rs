use std::fmt::Write;

use rscp_protocol::{Output, TagDictionary};

/// One line per output: `NAME[index]: value unit (interpretation)`
pub fn format_output(dictionary: &dyn TagDictionary, output: &Output) -> String {
    let mut line = String::new();
    match output {
        Output::Reading(reading) => {
            push_name(&mut line, dictionary, reading.tag);
            if let Some(index) = reading.index {
                let _ = write!(line, "[{index}]");
            }
            let _ = write!(line, ": {}", reading.value);
            if let Some(unit) = dictionary.unit(reading.tag) {
                let _ = write!(line, " {unit}");
            }
            if let Some(interpretation) = &reading.interpretation {
                let _ = write!(line, " ({interpretation})");
            }
        }
        Output::DeviceError { tag, code } => {
            push_name(&mut line, dictionary, *tag);
            let _ = write!(line, ": device error {code}");
        }
    }
    line
}

fn push_name(line: &mut String, dictionary: &dyn TagDictionary, tag: rscp_protocol::Tag) {
    match dictionary.name(tag) {
        Some(name) => line.push_str(name),
        None => {
            let _ = write!(line, "{tag}");
        }
    }
}
