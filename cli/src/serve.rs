//! Newline-delimited JSON request loop.

use std::io::{BufRead, Write};
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::handler::{Handler, Request, Response};

/// Answer each JSON request line on `input` with one JSON line on `output`.
///
/// Blank lines are skipped. A malformed line gets an error response and the
/// loop keeps going; only I/O failures end it. Returns the number of
/// requests answered.
pub fn serve<R: BufRead, W: Write>(handler: &Handler<'_>, input: R, mut output: W) -> Result<u64> {
    let mut answered = 0u64;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let start = Instant::now();
        let (op, response) = match serde_json::from_str::<Request>(line) {
            Ok(request) => (request.op(), handler.respond(request)),
            Err(e) => {
                warn!(error = %e, "rail_graph: unparseable request");
                ("unknown", Response::from_error(&Error::Json(e)))
            }
        };
        answered += 1;

        info!(
            request = answered,
            op,
            ok = !response.is_error(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "request completed"
        );

        serde_json::to_writer(&mut output, &response)?;
        output.write_all(b"\n")?;
        output.flush()?;
    }

    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use rail_graph_core::GraphStore;
    use std::io::Cursor;

    fn lines(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8(out.to_vec())
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_serve_load_then_query() {
        let store = GraphStore::new();
        let settings = Settings::default();
        let handler = Handler::new(&store, &settings);

        let input = concat!(
            r#"{"op":"load","edges":"AB5, BC4, CD8, DC8, DE6, AD5, CE2, EB3, AE7"}"#,
            "\n\n",
            r#"{"op":"shortest","from":"A","to":"C"}"#,
            "\n",
            r#"{"op":"load","edges":"AB1"}"#,
            "\n",
            r#"{"op":"shortest","from":"A","to":"C"}"#,
            "\n",
        );
        let mut out = Vec::new();
        let answered = serve(&handler, Cursor::new(input), &mut out).unwrap();
        assert_eq!(answered, 4);

        let responses = lines(&out);
        assert_eq!(responses[0]["generation"], 1);
        assert_eq!(responses[1]["distance"], 9);
        assert_eq!(responses[2]["generation"], 2);
        assert_eq!(responses[3]["kind"], "unreachable");
    }

    #[test]
    fn test_serve_survives_bad_lines() {
        let store = GraphStore::new();
        let settings = Settings::default();
        let handler = Handler::new(&store, &settings);

        let input = "not json\n{\"op\":\"teleport\"}\n{\"op\":\"status\"}\n";
        let mut out = Vec::new();
        assert_eq!(serve(&handler, Cursor::new(input), &mut out).unwrap(), 3);

        let responses = lines(&out);
        assert_eq!(responses[0]["kind"], "badRequest");
        assert_eq!(responses[1]["kind"], "badRequest");
        assert_eq!(responses[2]["status"], "empty");
    }
}
