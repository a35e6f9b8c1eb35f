//! Streamed GPX 1.1 track production: one track, one segment.
use std::io::{Result as IoResult, Write};

use serde::{Deserialize, Serialize};

use crate::{
    convert::table::Row,
    epoch::{format_gpx_time, parse_log_time},
};

/// GPX 1.1 namespace
pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

/// Speed and course extension namespace (`gpxtpx:` prefix)
pub const TRACKPOINT_EXT_NAMESPACE: &str =
    "http://www.garmin.com/xmlschemas/TrackPointExtension/v2";

/// Accuracy extension namespace (`acc:` prefix)
pub const ACCURACY_EXT_NAMESPACE: &str = "urn:tournav:accuracy:1";

/// GPX production options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpxOptions {
    /// Indentation width, in spaces
    pub indent: usize,
    /// Line separator
    pub line_separator: String,
    /// Emit speed and course extension block
    pub speed_course: bool,
    /// Emit accuracy extension block
    pub accuracy: bool,
    /// `creator` attribute
    pub creator: String,
    /// Optional track name
    pub track_name: Option<String>,
}

impl Default for GpxOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            line_separator: "\n".to_string(),
            speed_course: true,
            accuracy: false,
            creator: format!("tournav {}", env!("CARGO_PKG_VERSION")),
            track_name: None,
        }
    }
}

/// One track point, as text. Missing or empty fields are not emitted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpxPoint {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub elevation: Option<String>,
    /// UTC time, already formatted
    pub time: Option<String>,
    pub speed: Option<String>,
    pub course: Option<String>,
    pub horizontal_accuracy: Option<String>,
    pub vertical_accuracy: Option<String>,
    pub speed_accuracy: Option<String>,
    pub course_accuracy: Option<String>,
}

fn field(row: &Row, name: &str) -> Option<String> {
    row.get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

impl GpxPoint {
    /// Builds a [GpxPoint] from a track log row. Time is normalized
    /// to UTC, and dropped when it cannot be interpreted.
    pub fn from_row(row: &Row) -> Self {
        Self {
            latitude: field(row, "latitude"),
            longitude: field(row, "longitude"),
            elevation: field(row, "altitude"),
            time: field(row, "time")
                .and_then(|t| parse_log_time(&t))
                .map(|t| format_gpx_time(&t)),
            speed: field(row, "speed"),
            course: field(row, "course"),
            horizontal_accuracy: field(row, "horizontalAccuracy"),
            vertical_accuracy: field(row, "verticalAccuracy"),
            speed_accuracy: field(row, "speedAccuracy"),
            course_accuracy: field(row, "courseAccuracy"),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Escapes text content. Only `&` and `"` are escaped.
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

/// [GpxWriter] streams track points. Document header is written lazily,
/// on the first point that has both coordinates: a writer that never
/// received such a point produces nothing at all.
pub struct GpxWriter<W: Write> {
    writer: W,
    options: GpxOptions,
    points: usize,
}

impl<W: Write> GpxWriter<W> {
    pub fn new(writer: W, options: GpxOptions) -> Self {
        Self {
            writer,
            options,
            points: 0,
        }
    }
    /// Number of points written so far
    pub fn points(&self) -> usize {
        self.points
    }
    /// Returns true once the document header was written
    pub fn header_written(&self) -> bool {
        self.points > 0
    }
    fn line(&mut self, depth: usize, content: &str) -> IoResult<()> {
        let indent = " ".repeat(depth * self.options.indent);
        write!(
            self.writer,
            "{}{}{}",
            indent, content, self.options.line_separator
        )
    }
    fn element(&mut self, depth: usize, name: &str, value: &str) -> IoResult<()> {
        self.line(depth, &format!("<{}>{}</{}>", name, escape(value), name))
    }
    fn header(&mut self) -> IoResult<()> {
        self.line(0, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        let mut gpx = format!(
            "<gpx version=\"1.1\" creator=\"{}\" xmlns=\"{}\"",
            escape(&self.options.creator),
            GPX_NAMESPACE
        );
        if self.options.speed_course {
            gpx.push_str(&format!(" xmlns:gpxtpx=\"{}\"", TRACKPOINT_EXT_NAMESPACE));
        }
        if self.options.accuracy {
            gpx.push_str(&format!(" xmlns:acc=\"{}\"", ACCURACY_EXT_NAMESPACE));
        }
        gpx.push('>');
        self.line(0, &gpx)?;
        self.line(1, "<trk>")?;
        if let Some(name) = self.options.track_name.clone() {
            self.element(2, "name", &name)?;
        }
        self.line(2, "<trkseg>")
    }
    /// Writes one track point. Points missing a coordinate are skipped:
    /// returns false in that case.
    pub fn write_point(&mut self, point: &GpxPoint) -> IoResult<bool> {
        let (lat, lon) = match (present(&point.latitude), present(&point.longitude)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Ok(false),
        };
        if self.points == 0 {
            self.header()?;
        }
        self.points += 1;

        self.line(
            3,
            &format!("<trkpt lat=\"{}\" lon=\"{}\">", escape(lat), escape(lon)),
        )?;
        if let Some(ele) = present(&point.elevation) {
            self.element(4, "ele", ele)?;
        }
        if let Some(time) = present(&point.time) {
            self.element(4, "time", time)?;
        }

        let speed_course: Vec<(&str, &str)> = if self.options.speed_course {
            [("speed", &point.speed), ("course", &point.course)]
                .into_iter()
                .filter_map(|(name, value)| present(value).map(|v| (name, v)))
                .collect()
        } else {
            Vec::new()
        };
        let accuracy: Vec<(&str, &str)> = if self.options.accuracy {
            [
                ("horizontal", &point.horizontal_accuracy),
                ("vertical", &point.vertical_accuracy),
                ("speed", &point.speed_accuracy),
                ("course", &point.course_accuracy),
            ]
            .into_iter()
            .filter_map(|(name, value)| present(value).map(|v| (name, v)))
            .collect()
        } else {
            Vec::new()
        };

        if !speed_course.is_empty() || !accuracy.is_empty() {
            self.line(4, "<extensions>")?;
            if !speed_course.is_empty() {
                self.line(5, "<gpxtpx:TrackPointExtension>")?;
                for (name, value) in speed_course {
                    self.element(6, &format!("gpxtpx:{}", name), value)?;
                }
                self.line(5, "</gpxtpx:TrackPointExtension>")?;
            }
            if !accuracy.is_empty() {
                self.line(5, "<acc:Accuracy>")?;
                for (name, value) in accuracy {
                    self.element(6, &format!("acc:{}", name), value)?;
                }
                self.line(5, "</acc:Accuracy>")?;
            }
            self.line(4, "</extensions>")?;
        }
        self.line(3, "</trkpt>")?;
        Ok(true)
    }
    /// Terminates the document, if it was ever started, flushes
    /// and returns the underlying stream.
    pub fn finish(mut self) -> IoResult<W> {
        if self.points > 0 {
            self.line(2, "</trkseg>")?;
            self.line(1, "</trk>")?;
            self.line(0, "</gpx>")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
    /// [Self::finish], where the underlying stream is closed (dropped)
    /// when `all` is set, otherwise handed back.
    pub fn close(self, all: bool) -> IoResult<Option<W>> {
        let writer = self.finish()?;
        if all {
            drop(writer);
            Ok(None)
        } else {
            Ok(Some(writer))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn point(lat: &str, lon: &str) -> GpxPoint {
        GpxPoint {
            latitude: Some(lat.to_string()),
            longitude: Some(lon.to_string()),
            ..Default::default()
        }
    }

    fn produce(options: GpxOptions, points: &[GpxPoint]) -> String {
        let mut w = GpxWriter::new(Vec::new(), options);
        for p in points {
            w.write_point(p).unwrap();
        }
        String::from_utf8(w.close(false).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn lazy_header() {
        let options = GpxOptions::default();
        assert_eq!(produce(options.clone(), &[]), "");
        let skipped = [
            GpxPoint {
                latitude: Some("1".to_string()),
                ..Default::default()
            },
            GpxPoint {
                longitude: Some("2".to_string()),
                ..Default::default()
            },
            point("", "2"),
        ];
        assert_eq!(produce(options.clone(), &skipped), "");

        let mut w = GpxWriter::new(Vec::new(), options);
        assert!(!w.write_point(&skipped[0]).unwrap());
        assert!(!w.header_written());
        assert!(w.write_point(&point("1", "2")).unwrap());
        assert!(w.header_written());
        assert_eq!(w.points(), 1);
    }

    #[test]
    fn minimal_document() {
        let options = GpxOptions {
            creator: "test".to_string(),
            ..Default::default()
        };
        let gpx = produce(options, &[point("1", "2")]);
        assert_eq!(
            gpx,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<gpx version=\"1.1\" creator=\"test\" xmlns=\"http://www.topografix.com/GPX/1/1\" xmlns:gpxtpx=\"http://www.garmin.com/xmlschemas/TrackPointExtension/v2\">
  <trk>
    <trkseg>
      <trkpt lat=\"1\" lon=\"2\">
      </trkpt>
    </trkseg>
  </trk>
</gpx>
"
        );
    }

    #[test]
    fn extensions() {
        let options = GpxOptions {
            creator: "test".to_string(),
            indent: 1,
            line_separator: "\r\n".to_string(),
            speed_course: true,
            accuracy: true,
            track_name: Some("Fish & \"Chips\"".to_string()),
        };
        let p = GpxPoint {
            elevation: Some("12.5".to_string()),
            time: Some("2021-06-21T21:10:15Z".to_string()),
            speed: Some("1.5".to_string()),
            course: Some(String::new()),
            horizontal_accuracy: Some("5".to_string()),
            course_accuracy: Some("-1".to_string()),
            ..point("35.5", "139.25")
        };
        let gpx = produce(options, &[p]);
        let expected = [
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
            "<gpx version=\"1.1\" creator=\"test\" xmlns=\"http://www.topografix.com/GPX/1/1\" xmlns:gpxtpx=\"http://www.garmin.com/xmlschemas/TrackPointExtension/v2\" xmlns:acc=\"urn:tournav:accuracy:1\">",
            " <trk>",
            "  <name>Fish &amp; &quot;Chips&quot;</name>",
            "  <trkseg>",
            "   <trkpt lat=\"35.5\" lon=\"139.25\">",
            "    <ele>12.5</ele>",
            "    <time>2021-06-21T21:10:15Z</time>",
            "    <extensions>",
            "     <gpxtpx:TrackPointExtension>",
            "      <gpxtpx:speed>1.5</gpxtpx:speed>",
            "     </gpxtpx:TrackPointExtension>",
            "     <acc:Accuracy>",
            "      <acc:horizontal>5</acc:horizontal>",
            "      <acc:course>-1</acc:course>",
            "     </acc:Accuracy>",
            "    </extensions>",
            "   </trkpt>",
            "  </trkseg>",
            " </trk>",
            "</gpx>",
            "",
        ]
        .join("\r\n");
        assert_eq!(gpx, expected);
    }

    #[test]
    fn disabled_extensions() {
        let options = GpxOptions {
            speed_course: false,
            accuracy: false,
            ..Default::default()
        };
        let p = GpxPoint {
            speed: Some("1.5".to_string()),
            horizontal_accuracy: Some("5".to_string()),
            ..point("1", "2")
        };
        let gpx = produce(options, &[p]);
        assert!(!gpx.contains("extensions"));
        assert!(!gpx.contains("xmlns:gpxtpx"));
        assert!(!gpx.contains("xmlns:acc"));
    }

    #[test]
    fn escaping() {
        assert_eq!(escape("a & b"), "a &amp; b");
        assert_eq!(escape("\"q\""), "&quot;q&quot;");
        assert_eq!(escape("<tag>'"), "<tag>'");
    }

    #[test]
    fn closing() {
        let w = GpxWriter::new(Vec::new(), GpxOptions::default());
        assert!(w.close(true).unwrap().is_none());
        let w = GpxWriter::new(Vec::new(), GpxOptions::default());
        assert_eq!(w.close(false).unwrap(), Some(Vec::new()));
    }
}
