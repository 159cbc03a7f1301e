use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::scene::Scene;
use crate::error::HepError;

pub fn write_scene(scene: &Scene, path: &Path) -> Result<(), HepError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, scene)?;
    writer.flush()?;
    Ok(())
}

pub fn read_scene(path: &Path) -> Result<Scene, HepError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::scene::{Drawable, LineStyle, Margins, Pad};
    use crate::render::colors::Rgba;

    #[test]
    fn scene_survives_disk() {
        let mut pad = Pad::new("top", Margins::default());
        pad.items.push(Drawable::Line {
            x1: 0.0,
            y1: 1.0,
            x2: 1.0,
            y2: 1.0,
            color: Rgba::BLACK,
            width: 1.0,
            style: LineStyle::Dashed,
        });
        let scene = Scene {
            name: "line".to_owned(),
            width: 100,
            height: 80,
            pads: vec![pad],
            texts: Vec::new(),
        };
        let path = std::env::temp_dir().join(format!("hepplot_scene_{}.json", std::process::id()));
        write_scene(&scene, &path).unwrap();
        let back = read_scene(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back, scene);
    }
}
