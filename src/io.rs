/**
 * RecoRank
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::fs::File;
use std::io::{stdout, BufWriter, Read, Write};
use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use tracing::info;

use crate::demographic::{Demographics, Profile};
use crate::error::{Error, Result};
use crate::matrix::{DenseMatrix, IndexedMatrix};
use crate::types::{DenseVector, Observation, RankedList};

/// Separates the items of the favourites column of a demographics file.
const FAVOURITES_SEPARATOR: char = '|';

/// Reads a CSV input file with a header line.
pub fn csv_reader<P: AsRef<Path>>(file: P, delimiter: u8) -> Result<csv::Reader<File>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(file)?;

    Ok(reader)
}

/// One line of a ratings file, `user_id,item_id,rating[,context]`.
#[derive(Debug, Deserialize)]
struct RatingRecord {
    user_id: String,
    item_id: String,
    rating: f64,
    #[serde(default)]
    context: Option<String>,
}

/// One line of a demographics file, `user_id,age,gender[,favorite_items]` where the
/// favourite items are separated by `|`.
#[derive(Debug, Deserialize)]
struct DemographicRecord {
    user_id: String,
    age: u32,
    gender: String,
    #[serde(default)]
    favorite_items: Option<String>,
}

pub fn read_observations<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Observation>> {

    let mut observations = Vec::new();

    for record in reader.deserialize() {
        let record: RatingRecord = record?;
        observations.push(Observation {
            row: record.user_id,
            column: record.item_id,
            value: record.rating,
            context: record.context.filter(|context| !context.is_empty()),
        });
    }

    info!(observations = observations.len(), "read ratings");

    Ok(observations)
}

pub fn read_demographics<R: Read>(reader: &mut csv::Reader<R>) -> Result<Demographics> {

    let mut demographics = Demographics::new();

    for record in reader.deserialize() {
        let record: DemographicRecord = record?;

        let favourites: Vec<String> = record.favorite_items
            .map(|items| {
                items.split(FAVOURITES_SEPARATOR)
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .map(|item| item.to_owned())
                    .collect()
            })
            .unwrap_or_default();

        demographics.insert(record.user_id, Profile {
            age: record.age,
            gender: record.gender,
            favourites,
        });
    }

    info!(users = demographics.len(), "read demographics");

    Ok(demographics)
}

/// Reads precomputed item features: an id column followed by one column per feature, the
/// header names the features.
pub fn read_features<R: Read>(reader: &mut csv::Reader<R>) -> Result<IndexedMatrix<DenseMatrix>> {

    let feature_names: Vec<String> = reader.headers()?
        .iter()
        .skip(1)
        .map(|name| name.to_owned())
        .collect();

    let mut ids = Vec::new();
    let mut rows: Vec<DenseVector> = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;

        let id = record.get(0)
            .ok_or_else(|| Error::InvalidArgument(format!("feature line {} is empty", line + 1)))?;

        let values = record.iter()
            .skip(1)
            .map(|value| {
                value.trim().parse::<f64>().map_err(|_| {
                    Error::InvalidArgument(format!(
                        "feature line {} has a non-numeric value '{}'", line + 1, value))
                })
            })
            .collect::<Result<DenseVector>>()?;

        ids.push(id.to_owned());
        rows.push(values);
    }

    info!(items = ids.len(), features = feature_names.len(), "read features");

    IndexedMatrix::from_feature_rows(ids, feature_names, rows)
}

/// Struct used for JSON serialization of computed recommendations. Field names will be used
/// in JSON.
#[derive(Serialize)]
struct Recommendations<'a> {
    #[serde(rename = "for")]
    query: &'a str,
    recommended: &'a [String],
}

/// Output the recommendations in JSON format, one line per query. If an `output_path` is
/// supplied, we write to a file at the specified path, otherwise, we output to stdout.
pub fn write_recommendations(
    recommendations: &[(String, RankedList)],
    output_path: Option<String>,
) -> Result<()> {

    let out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(Path::new(&path))?),
        None => Box::new(stdout()),
    };

    write_json_lines(recommendations, BufWriter::new(out))
}

pub fn write_json_lines<W: Write>(recommendations: &[(String, RankedList)], mut out: W)
    -> Result<()> {

    for (query, recommended) in recommendations.iter() {
        let line = serde_json::to_string(&Recommendations { query, recommended })?;
        writeln!(out, "{}", line)?;
    }

    out.flush()?;

    Ok(())
}
