//! Text rows for the point cloud and questionnaire files.

use anyhow::{anyhow, Result};
use ::csv::{Terminator, Writer, WriterBuilder};
use glam::Vec3;

use crate::session::{CloudPoint, QuestionnaireAnswer};

pub const QA_HEADER: [&str; 5] = ["estX", "estY", "estZ", "answer", "timestamp"];

/// Six decimals, with negative zero written as `0.000000`.
pub fn fixed6(value: f64) -> String {
    let text = format!("{value:.6}");
    match text.strip_prefix('-') {
        Some(rest) if rest.bytes().all(|b| b == b'0' || b == b'.') => rest.to_string(),
        _ => text,
    }
}

fn push_vec3(record: &mut Vec<String>, v: Vec3) {
    record.extend(v.to_array().map(|c| fixed6(f64::from(c))));
}

/// `x,y,z,timestamp,hx,hy,hz,fx,fy,fz,ox,oy,oz,dx,dy,dz`
pub fn point_cloud_record(point: &CloudPoint) -> Vec<String> {
    let mut record = Vec::with_capacity(16);
    push_vec3(&mut record, point.position);
    record.push(fixed6(point.sample.timestamp));
    push_vec3(&mut record, point.sample.head_position);
    push_vec3(&mut record, point.sample.head_forward);
    push_vec3(&mut record, point.sample.eye_origin);
    push_vec3(&mut record, point.sample.eye_direction);
    record
}

fn writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(mut wtr: Writer<Vec<u8>>) -> Result<String> {
    wtr.flush()?;
    String::from_utf8(wtr.into_inner()?)
        .map_err(|e| anyhow!("Failed to convert CSV to string: {}", e))
}

/// Header-less point cloud, one line per accepted sample.
pub fn point_cloud(points: &[CloudPoint]) -> Result<String> {
    let mut wtr = writer();
    for point in points {
        wtr.write_record(point_cloud_record(point))?;
    }
    finish(wtr)
}

/// Header plus one answer row.
pub fn questionnaire(answer: &QuestionnaireAnswer) -> Result<String> {
    let p = answer.estimated_local_position;
    let mut wtr = writer();
    wtr.write_record(QA_HEADER)?;
    wtr.write_record([
        fixed6(f64::from(p.x)),
        fixed6(f64::from(p.y)),
        fixed6(f64::from(p.z)),
        answer.answer_text.clone(),
        fixed6(answer.timestamp),
    ])?;
    finish(wtr)
}
