//! Line protocol between the bridge and its `wish` helper process.
//!
//! Requests are Tcl commands written to the helper's stdin, one per line:
//!
//! ```text
//! __wb_request send nWave:1 wvSetCursor 1500
//! ```
//!
//! Every word is backslash-quoted by [`quote_word`] so that arbitrary text
//! (brackets, braces, dollars, newlines) reaches the helper unchanged.
//!
//! The helper answers on stdout with tab-separated lines:
//!
//! ```text
//! R<TAB>ok<TAB>field...        reply to the oldest pending request
//! R<TAB>err<TAB>message        request failed inside the helper
//! E<TAB>command<TAB>arg...     a remote application invoked a local command
//! ```
//!
//! Fields escape backslash, newline, tab and carriage return as `\\`, `\n`,
//! `\t` and `\r`.

/// A remote invocation of one of our local commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCall {
    /// Local command name that was invoked.
    pub command: String,
    /// Arguments, one per Tcl word.
    pub args: Vec<String>,
}

/// One parsed line of helper output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperLine {
    /// Reply to the oldest outstanding request.
    Reply(Result<Vec<String>, String>),
    /// Inbound command invocation.
    Inbound(InboundCall),
}

/// Quote one Tcl word so the Tcl parser reproduces `word` exactly.
pub fn quote_word(word: &str) -> String {
    if word.is_empty() {
        return "{}".to_string();
    }

    let mut quoted = String::with_capacity(word.len() * 2);
    for ch in word.chars() {
        match ch {
            // Tcl backslash-newline is a line continuation, never emit it
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => {
                quoted.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if c.is_ascii_alphanumeric() || "_-./:,+=@%".contains(c) => quoted.push(c),
            c if !c.is_ascii() => quoted.push(c),
            c => {
                quoted.push('\\');
                quoted.push(c);
            }
        }
    }
    quoted
}

/// Build a request line for the helper's `__wb_request` dispatcher.
pub fn request_line(op: &str, words: &[&str]) -> String {
    let mut line = String::from("__wb_request ");
    line.push_str(&quote_word(op));
    for word in words {
        line.push(' ');
        line.push_str(&quote_word(word));
    }
    line.push('\n');
    line
}

/// Escape a field the way the helper does.
pub fn encode_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for ch in field.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Reverse [`encode_field`]. Unknown escapes are kept verbatim.
pub fn decode_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse one line of helper output. Returns `None` for anything that is
/// not part of the protocol (stray `puts` from the helper, blank lines).
pub fn parse_line(line: &str) -> Option<HelperLine> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = line.split('\t');
    match fields.next()? {
        "R" => match fields.next()? {
            "ok" => Some(HelperLine::Reply(Ok(fields.map(decode_field).collect()))),
            "err" => {
                let message = fields.map(decode_field).collect::<Vec<_>>().join(" ");
                Some(HelperLine::Reply(Err(message)))
            }
            _ => None,
        },
        "E" => {
            let command = decode_field(fields.next()?);
            let args = fields.map(decode_field).collect();
            Some(HelperLine::Inbound(InboundCall { command, args }))
        }
        _ => None,
    }
}

/// Tcl script that turns a fresh `wish` into the bridge helper.
///
/// Hides the main window, registers under `app_name` and defines the
/// request dispatcher. Tk may append ` #2` etc. to the name when it is
/// already taken; the `name` request reports the actual one.
pub fn bootstrap_script(app_name: &str) -> String {
    format!(
        r#"wm withdraw .
wm overrideredirect . 1
fconfigure stdin -encoding utf-8
fconfigure stdout -translation lf -buffering line -encoding utf-8
set ::__wb_name [tk appname {app}]
proc __wb_encode {{s}} {{
    string map [list \\ \\\\ \n \\n \t \\t \r \\r] $s
}}
proc __wb_emit {{tag fields}} {{
    set line $tag
    foreach field $fields {{
        append line \t [__wb_encode $field]
    }}
    puts stdout $line
    flush stdout
}}
proc __wb_inbound {{name args}} {{
    __wb_emit E [linsert $args 0 $name]
    return {{}}
}}
proc __wb_dispatch {{op words}} {{
    switch -- $op {{
        name {{ return [list $::__wb_name] }}
        interps {{ return [winfo interps] }}
        send {{ return [list [send -- {{*}}$words]] }}
        command {{
            set name [lindex $words 0]
            interp alias {{}} $name {{}} __wb_inbound $name
            return [list $name]
        }}
        destroy {{
            after idle {{ destroy .; exit 0 }}
            return {{}}
        }}
        default {{ error "unknown request '$op'" }}
    }}
}}
proc __wb_request {{op args}} {{
    if {{[catch {{__wb_dispatch $op $args}} fields]}} {{
        __wb_emit R [list err $fields]
    }} else {{
        __wb_emit R [linsert $fields 0 ok]
    }}
}}
"#,
        app = quote_word(app_name)
    )
}
