//! Entities of the USDA Standard Reference release
//!
//! Field names follow the SR documentation's column names in snake case.
//! Numeric columns that the release leaves blank are `Option`s.

sr_entity! {
    /// Food group description (FD_GROUP)
    pub struct FoodGroup {
        id = "FoodGroup",
        table = "food_groups",
        fields {
            fdgrp_cd: String,
            fdgrp_desc: String,
        }
    }
}

sr_entity! {
    /// Food description (FOOD_DES)
    pub struct Food {
        id = "Food",
        table = "foods",
        fields {
            /// 5-digit Nutrient Databank number, kept as text for its leading zeros
            ndb_no: String,
            fdgrp_cd: String,
            long_desc: String,
            shrt_desc: String,
            com_name: Option<String>,
            manufac_name: Option<String>,
            survey: Option<String>,
            ref_desc: Option<String>,
            /// Percentage of refuse
            refuse: Option<i64>,
            sci_name: Option<String>,
            n_factor: Option<f64>,
            pro_factor: Option<f64>,
            fat_factor: Option<f64>,
            cho_factor: Option<f64>,
        }
    }
}

sr_entity! {
    /// Nutrient definition (NUTR_DEF)
    pub struct NutrientDefinition {
        id = "NutrientDefinition",
        table = "nutrient_definitions",
        fields {
            nutr_no: String,
            units: String,
            tagname: Option<String>,
            nutr_desc: String,
            num_dec: Option<i64>,
            sr_order: Option<i64>,
        }
    }
}

sr_entity! {
    /// Nutrient value of one food (NUT_DATA)
    pub struct NutrientData {
        id = "NutrientData",
        table = "nutrient_data",
        fields {
            ndb_no: String,
            nutr_no: String,
            /// Amount in 100 grams, edible portion
            nutr_val: f64,
            num_data_pts: Option<i64>,
            std_error: Option<f64>,
            src_cd: Option<String>,
            deriv_cd: Option<String>,
            ref_ndb_no: Option<String>,
            add_nutr_mark: Option<String>,
            num_studies: Option<i64>,
            min: Option<f64>,
            max: Option<f64>,
            df: Option<i64>,
            low_eb: Option<f64>,
            up_eb: Option<f64>,
            stat_cmt: Option<String>,
            /// "MM/YYYY" as published
            addmod_date: Option<String>,
            cc: Option<String>,
        }
    }
}

sr_entity! {
    /// Household weight of a food (WEIGHT)
    pub struct Weight {
        id = "Weight",
        table = "weights",
        fields {
            ndb_no: String,
            seq: String,
            amount: f64,
            msre_desc: String,
            gm_wgt: f64,
            num_data_pts: Option<i64>,
            std_dev: Option<f64>,
        }
    }
}

sr_entity! {
    /// Footnote on a food or a food/nutrient pair (FOOTNOTE)
    pub struct Footnote {
        id = "Footnote",
        table = "footnotes",
        fields {
            ndb_no: String,
            footnt_no: String,
            footnt_typ: String,
            nutr_no: Option<String>,
            footnt_txt: String,
        }
    }
}

sr_entity! {
    /// LanguaL factor assigned to a food (LANGUAL)
    pub struct LangualFactor {
        id = "LangualFactor",
        table = "langual_factors",
        fields {
            ndb_no: String,
            factor_code: String,
        }
    }
}

sr_entity! {
    /// LanguaL factor description (LANGDESC)
    pub struct LangualDescription {
        id = "LangualDescription",
        table = "langual_descriptions",
        fields {
            factor_code: String,
            description: String,
        }
    }
}

sr_entity! {
    /// Source code (SRC_CD)
    pub struct SourceCode {
        id = "SourceCode",
        table = "source_codes",
        fields {
            src_cd: String,
            srccd_desc: String,
        }
    }
}

sr_entity! {
    /// Data derivation code (DERIV_CD)
    pub struct DerivationCode {
        id = "DerivationCode",
        table = "derivation_codes",
        fields {
            deriv_cd: String,
            deriv_desc: String,
        }
    }
}

sr_entity! {
    /// Literature reference (DATA_SRC)
    pub struct DataSource {
        id = "DataSource",
        table = "data_sources",
        fields {
            datasrc_id: String,
            authors: Option<String>,
            title: String,
            year: Option<String>,
            journal: Option<String>,
            vol_city: Option<String>,
            issue_state: Option<String>,
            start_page: Option<String>,
            end_page: Option<String>,
        }
    }
}

sr_entity! {
    /// Link from a nutrient value to its references (DATSRCLN)
    pub struct DataSourceLink {
        id = "DataSourceLink",
        table = "data_source_links",
        fields {
            ndb_no: String,
            nutr_no: String,
            datasrc_id: String,
        }
    }
}
