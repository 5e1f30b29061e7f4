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

use std::env;
use std::error::Error;
use std::process;
use std::time::Instant;

use getopts::{Matches, Options};
use tracing::{info, warn};

use recorank::{batch, config, io, utils};
use recorank::matrix::Matrix;
use recorank::{ContentRecommender, EngineConfig, RankedList, Recommender, Similarity, Storage,
    Strategy};

const DELIMITER: u8 = b',';

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Ratings file (required unless --features is given). A CSV \
        file with a header and the columns user_id, item_id, rating and optionally context.",
        "PATH");
    opts.optopt("f", "features", "Item feature file for the content strategy. A CSV file with \
        a header, an id column followed by one numeric column per feature.", "PATH");
    opts.optopt("d", "demographics", "User demographics for the demographic and favourites \
        strategies. A CSV file with the columns user_id, age, gender and favorite_items \
        (separated by |).", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("s", "strategy", "One of item, user, model, context, hybrid, demographic, \
        favourites or content (optional, defaults to user).", "NAME");
    opts.optopt("q", "query", "The user, item or context to recommend for (optional, \
        recommendations for all of them are computed by default).", "KEY");
    opts.optopt("c", "context", "Context to combine with the user's favourites, required by \
        the hybrid strategy.", "CONTEXT");
    opts.optopt("n", "num-recommendations", "Number of recommendations per query (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("k", "neighbors", "Number of similar users to aggregate (optional, defaults \
        to 10).", "NUMBER");
    opts.optopt("r", "rank", "Embedding rank of the model strategy (optional, defaults to 10).",
        "NUMBER");
    opts.optopt("", "seed", "Seed of the random projection of the model strategy (optional, \
        defaults to 42).", "NUMBER");
    opts.optopt("m", "similarity", "Similarity of the content strategy, one of cosine, dot or \
        shared (optional, defaults to cosine).", "NAME");
    opts.optflag("", "sparse", "Store only the observed ratings, for large and mostly empty \
        rating matrices.");
    opts.optopt("", "config", "JSON configuration file (optional), flags take precedence.",
        "PATH");
    opts.optopt("t", "threads", "Number of threads for computing many queries (optional, \
        defaults to the number of CPUs).", "NUMBER");
    opts.optopt("v", "log-level", "Log level (optional, defaults to info).", "LEVEL");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    if !matches.opt_present("i") && !matches.opt_present("f") {
        return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        );
    }

    let log_level = matches.opt_str("v").unwrap_or_else(|| "info".to_owned());
    if let Err(failure) = utils::init_logging(&log_level) {
        let hint = failure.to_string();
        return print_usage_and_exit(&program, opts, Some(&hint));
    }

    if let Err(failure) = run(&matches) {
        eprintln!("{}", failure);
        process::exit(1);
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    process::exit(if hint.is_some() { 2 } else { 0 });
}

fn run(matches: &Matches) -> Result<(), Box<dyn Error>> {

    let mut engine_config: EngineConfig = match matches.opt_str("config") {
        Some(path) => config::load(&path)?,
        None => EngineConfig::default(),
    };

    engine_config.num_recommendations =
        matches.opt_get_default("n", engine_config.num_recommendations)?;
    engine_config.neighbors = matches.opt_get_default("k", engine_config.neighbors)?;
    engine_config.embedding.rank = matches.opt_get_default("r", engine_config.embedding.rank)?;
    engine_config.embedding.seed = matches.opt_get_default("seed", engine_config.embedding.seed)?;
    if let Some(name) = matches.opt_str("m") {
        engine_config.content_similarity = Similarity::from_name(&name)?;
    }
    if matches.opt_present("sparse") {
        engine_config.storage = Storage::Sparse;
    }
    engine_config.validate()?;

    let strategy_name = matches.opt_str("s").unwrap_or_else(|| "user".to_owned());
    let threads: usize = matches.opt_get_default("t", num_cpus::get())?;
    let n = engine_config.num_recommendations;

    let start = Instant::now();

    let results = if strategy_name == "content" {

        let features_path = matches.opt_str("f")
            .ok_or("the content strategy needs a feature file, see --features")?;

        info!("Reading item features from {}", features_path);
        let features = io::read_features(&mut io::csv_reader(&features_path, DELIMITER)?)?;
        let recommender = ContentRecommender::new(features, engine_config.content_similarity);

        let queries = queries(matches, || recommender.items().to_vec());
        batch::recommend_all(&queries, threads, |item| recommender.similar_items(item, n))

    } else {

        let strategy = Strategy::from_name(&strategy_name, matches.opt_str("c").as_deref())?;
        if strategy == Strategy::ModelBased {
            engine_config.factorize = true;
        }

        let ratings_path = matches.opt_str("i")
            .ok_or("this strategy needs a ratings file, see --inputfile")?;

        info!("Reading ratings from {}", ratings_path);
        let observations = io::read_observations(&mut io::csv_reader(&ratings_path, DELIMITER)?)?;

        match engine_config.storage {
            Storage::Dense => {
                let recommender = Recommender::new(observations, engine_config)?;
                recommend_for_queries(recommender, matches, &strategy, threads, n)?
            },
            Storage::Sparse => {
                let recommender = Recommender::new_sparse(observations, engine_config)?;
                recommend_for_queries(recommender, matches, &strategy, threads, n)?
            },
        }
    };

    // A single query must succeed, in batch mode we skip the failing ones
    let single_query = matches.opt_present("q");
    let mut recommendations: Vec<(String, RankedList)> = Vec::with_capacity(results.len());

    for (query, result) in results {
        match result {
            Ok(recommended) => recommendations.push((query, recommended)),
            Err(failure) if single_query => return Err(failure.into()),
            Err(failure) => warn!("No recommendations for {}: {}", query, failure),
        }
    }

    info!(
        "Computed recommendations for {} queries in {}ms",
        recommendations.len(),
        utils::to_millis(start.elapsed()),
    );

    io::write_recommendations(&recommendations, matches.opt_str("o"))?;

    Ok(())
}

fn recommend_for_queries<M: Matrix + Sync>(
    mut recommender: Recommender<M>,
    matches: &Matches,
    strategy: &Strategy,
    threads: usize,
    n: usize,
) -> Result<Vec<(String, recorank::Result<RankedList>)>, Box<dyn Error>> {

    info!(
        "Built a ratings matrix of {} users and {} items",
        recommender.ratings().row_index().len(),
        recommender.ratings().column_index().len(),
    );

    if let Some(demographics_path) = matches.opt_str("d") {
        info!("Reading demographics from {}", demographics_path);
        let demographics = io::read_demographics(
            &mut io::csv_reader(&demographics_path, DELIMITER)?)?;
        recommender = recommender.with_demographics(demographics);
    }

    let all_keys = recommender.query_keys(strategy)?;
    let queries = queries(matches, || all_keys);

    Ok(batch::recommend_all(&queries, threads, |query| recommender.recommend(strategy, query, n)))
}

fn queries<F>(matches: &Matches, all: F) -> Vec<String>
    where F: FnOnce() -> Vec<String> {

    match matches.opt_str("q") {
        Some(query) => vec![query],
        None => all(),
    }
}
