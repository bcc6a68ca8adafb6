use crate::core::math::Vec3;
use crate::rendering::texture::TextureCube;
use crate::viewer::asset::Asset;
use crate::viewer::Error;
use std::fs;
use std::path::{Path, PathBuf};

const SH_BAND_COUNT: usize = 9;

/// Image based lighting inputs baked offline: a prefiltered reflection
/// cubemap, a skybox cubemap, and nine spherical harmonics bands for
/// irradiance.
pub struct Ibl {
    pub prefiltered: TextureCube,
    pub skybox: TextureCube,
    pub spherical_harmonics: [Vec3; SH_BAND_COUNT],
}

impl Ibl {
    /// Loads a baked IBL directory: `<name>_ibl.ktx`, `<name>_skybox.ktx`
    /// and `sh.txt`.
    pub fn load_from_directory(dir: &Path) -> Result<Ibl, Error> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let prefiltered_path = find_file_with_suffix(dir, "_ibl.ktx")?;
        let skybox_path = find_file_with_suffix(dir, "_skybox.ktx")?;

        let sh_path = dir.join("sh.txt");
        let sh_text = fs::read_to_string(&sh_path).map_err(|source| Error::Io {
            path: sh_path.clone(),
            source,
        })?;
        let spherical_harmonics = parse_spherical_harmonics(&sh_text).map_err(|reason| {
            Error::Parse {
                path: sh_path,
                reason,
            }
        })?;

        let prefiltered =
            TextureCube::load(&prefiltered_path, None).map_err(|reason| Error::Asset {
                path: prefiltered_path.clone(),
                reason,
            })?;
        let skybox = TextureCube::load(&skybox_path, None).map_err(|reason| Error::Asset {
            path: skybox_path.clone(),
            reason,
        })?;

        Ok(Ibl {
            prefiltered,
            skybox,
            spherical_harmonics,
        })
    }
}

/// Finds the single file in `dir` ending with `suffix`; ties are broken
/// alphabetically so repeated runs pick the same file.
pub(crate) fn find_file_with_suffix(dir: &Path, suffix: &'static str) -> Result<PathBuf, Error> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().ends_with(suffix))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or(Error::MissingCubemap {
        path: dir.to_path_buf(),
        suffix,
    })
}

/// Parses the `sh.txt` a baking run leaves next to the cubemaps: nine
/// lines of `(r, g, b)`, trailing comments tolerated.
pub(crate) fn parse_spherical_harmonics(text: &str) -> Result<[Vec3; SH_BAND_COUNT], String> {
    let mut bands = [Vec3::new(0.0, 0.0, 0.0); SH_BAND_COUNT];
    let mut count = 0;

    for line in text.lines() {
        let open = match line.find('(') {
            Some(open) => open,
            None => continue,
        };
        let close = line[open..]
            .find(')')
            .map(|close| open + close)
            .ok_or_else(|| format!("unterminated band on line: {}", line.trim()))?;

        let components: Vec<f32> = line[open + 1..close]
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("bad band on line '{}': {}", line.trim(), e))?;

        if components.len() != 3 {
            return Err(format!(
                "expected 3 components per band, got {} on line: {}",
                components.len(),
                line.trim()
            ));
        }

        if count >= SH_BAND_COUNT {
            return Err(String::from("more than 9 spherical harmonics bands"));
        }
        bands[count] = Vec3::new(components[0], components[1], components[2]);
        count += 1;
    }

    if count != SH_BAND_COUNT {
        return Err(format!("expected 9 spherical harmonics bands, got {}", count));
    }

    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    const SAMPLE_SH: &str = "\
( 0.592,  0.580,  0.563); // L00, irradiance, pre-scaled base
(-0.042,  0.067,  0.162); // L1-1, irradiance, pre-scaled base
( 0.009,  0.021,  0.044); // L10, irradiance, pre-scaled base
( 0.119,  0.112,  0.101); // L11, irradiance, pre-scaled base
(-0.022,  -0.019, -0.014); // L2-2
( 0.017,  0.021,  0.030); // L2-1
(-0.052, -0.047, -0.042); // L20
( 0.014,  0.014,  0.012); // L21
( 0.036,  0.032,  0.028); // L22
";

    #[test]
    fn parses_nine_bands_with_comments() {
        let bands = parse_spherical_harmonics(SAMPLE_SH).unwrap();

        assert_eq!(bands[0], Vec3::new(0.592, 0.580, 0.563));
        assert_eq!(bands[1], Vec3::new(-0.042, 0.067, 0.162));
        assert_eq!(bands[8], Vec3::new(0.036, 0.032, 0.028));
    }

    #[test]
    fn rejects_short_and_malformed_inputs() {
        assert!(parse_spherical_harmonics("(1.0, 2.0, 3.0)").is_err());
        assert!(parse_spherical_harmonics("").is_err());

        let malformed = SAMPLE_SH.replace("0.592", "zero point six");
        assert!(parse_spherical_harmonics(&malformed).is_err());

        let two_components = SAMPLE_SH.replace("( 0.036,  0.032,  0.028)", "(0.036, 0.032)");
        assert!(parse_spherical_harmonics(&two_components).is_err());
    }

    #[test]
    fn directory_scan_finds_the_cubemap_pair() {
        let dir = std::env::temp_dir().join(format!("ibl-scan-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        for name in ["noon_grass_ibl.ktx", "noon_grass_skybox.ktx", "sh.txt"] {
            File::create(dir.join(name)).unwrap();
        }

        let ibl = find_file_with_suffix(&dir, "_ibl.ktx").unwrap();
        assert!(ibl.ends_with("noon_grass_ibl.ktx"));

        let skybox = find_file_with_suffix(&dir, "_skybox.ktx").unwrap();
        assert!(skybox.ends_with("noon_grass_skybox.ktx"));

        assert!(matches!(
            find_file_with_suffix(&dir, "_dfg.ktx"),
            Err(Error::MissingCubemap { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
