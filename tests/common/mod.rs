#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use karaoke::{FontFace, is_ffmpeg_on_path};

const CANDIDATE_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// `KARAOKE_TEST_FONT`, else the first system font found.
pub fn font_path() -> Option<PathBuf> {
    std::env::var_os("KARAOKE_TEST_FONT")
        .map(PathBuf::from)
        .into_iter()
        .chain(CANDIDATE_FONTS.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}

pub fn font(size_px: f32) -> Option<FontFace> {
    let path = font_path()?;
    Some(FontFace::load(&path, size_px).unwrap())
}

/// Both `ffmpeg` and `ffprobe` run.
pub fn media_tools_available() -> bool {
    is_ffmpeg_on_path()
        && Command::new("ffprobe")
            .arg("-version")
            .output()
            .is_ok_and(|o| o.status.success())
}

/// Fresh scratch directory `target/<suite>/<name>`.
pub fn work_dir(suite: &str, name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join(suite).join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
