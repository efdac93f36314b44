//! Shared fixtures: a miniature SR release
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// One or two real-looking rows for every file of the bundled mapping
pub const SR_FILES: &[(&str, &str)] = &[
    (
        "FD_GROUP.txt",
        "~0100~^~Dairy and Egg Products~\r\n~0200~^~Spices and Herbs~\r\n",
    ),
    (
        "FOOD_DES.txt",
        "~01001~^~0100~^~Butter, salted~^~BUTTER,WITH SALT~^~~^~~^~Y~^~~^0^~~^6.38^4.27^8.79^3.87\r\n\
         ~02001~^~0200~^~Spices, allspice, ground~^~ALLSPICE,GROUND~^~~^~~^~Y~^~~^0^~Pimenta dioica~^6.25^2.44^8.37^3.57\r\n",
    ),
    (
        "NUTR_DEF.txt",
        "~203~^~g~^~PROCNT~^~Protein~^~2~^~600~\r\n~204~^~g~^~FAT~^~Total lipid (fat)~^~2~^~800~\r\n",
    ),
    (
        "NUT_DATA.txt",
        "~01001~^~203~^0.85^16^0.074^~1~^~~^~~^~~^^^^^^^~~^~11/1976~^~~\r\n\
         ~01001~^~204~^81.11^580^0.065^~1~^~~^~~^~~^^^^^^^~~^~11/1976~^~~\r\n",
    ),
    (
        "WEIGHT.txt",
        "~01001~^~1~^1^~pat (1\" sq, 1/3\" high)~^5.0^^\r\n~01001~^~2~^1^~tbsp~^14.2^^\r\n",
    ),
    (
        "FOOTNOTE.txt",
        "~01001~^~01~^~D~^~~^~Vitamin A footnote~\r\n",
    ),
    ("LANGUAL.txt", "~01001~^~A0107~\r\n"),
    ("LANGDESC.txt", "~A0107~^~Food Contact Surface Not Known~\r\n"),
    ("SRC_CD.txt", "~1~^~Analytical or derived from analytical~\r\n"),
    ("DERIV_CD.txt", "~A~^~Analytical data~\r\n"),
    (
        "DATA_SRC.txt",
        "~D1066~^~G.V. Mann~^~The Health and Nutritional status of Alaskan Eskimos.~^~1962~^~American Journal of Clinical Nutrition~^~11~^~~^~31~^~76~\r\n",
    ),
    ("DATSRCLN.txt", "~01001~^~203~^~D1066~\r\n"),
];

/// Record count per entity of [`SR_FILES`]
pub const SR_RECORDS: &[(&str, u64)] = &[
    ("FoodGroup", 2),
    ("Food", 2),
    ("NutrientDefinition", 2),
    ("NutrientData", 2),
    ("Weight", 2),
    ("Footnote", 1),
    ("LangualFactor", 1),
    ("LangualDescription", 1),
    ("SourceCode", 1),
    ("DerivationCode", 1),
    ("DataSource", 1),
    ("DataSourceLink", 1),
];

/// Zip bytes holding `files`
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// The miniature release as zip bytes
pub fn sr_archive() -> Vec<u8> {
    zip_bytes(SR_FILES)
}

/// Write the miniature release's flat files into `dir`
pub fn write_sr_files(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    for (name, content) in SR_FILES {
        std::fs::write(dir.join(name), content).unwrap();
    }
}
