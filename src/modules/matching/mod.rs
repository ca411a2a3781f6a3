//! Brute-force nearest-neighbour descriptor matching.

use rayon::prelude::*;

use crate::modules::features::DescriptorSet;
use crate::settings::MatchSettings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
	pub query_index: usize,
	pub train_index: usize,
	pub distance: f32,
}

pub struct Matcher {
	distance_multiplier: f32,
	min_distance_floor: f32,
}

impl Matcher {
	pub fn new(settings: &MatchSettings) -> Self {
		Self {
			distance_multiplier: settings.distance_multiplier,
			min_distance_floor: settings.min_distance_floor,
		}
	}

	/// Nearest neighbours, filtered to those within `distance_multiplier` of the best.
	pub fn match_sets(&self, query: &DescriptorSet, reference: &DescriptorSet) -> Vec<Correspondence> {
		self.filter(self.nearest(query, reference))
	}

	/// One correspondence per query descriptor, in query order.
	pub fn nearest(&self, query: &DescriptorSet, reference: &DescriptorSet) -> Vec<Correspondence> {
		if query.is_empty() || reference.is_empty() {
			return Vec::new();
		}

		let train = reference.descriptors();
		query
			.descriptors()
			.par_iter()
			.enumerate()
			.filter_map(|(query_index, desc)| {
				train
					.iter()
					.enumerate()
					.map(|(train_index, other)| (train_index, l2_distance(desc, other)))
					.min_by(|a, b| a.1.total_cmp(&b.1))
					.map(|(train_index, distance)| Correspondence {
						query_index: query_index,
						train_index: train_index,
						distance: distance,
					})
			})
			.collect()
	}

	pub fn filter(&self, matches: Vec<Correspondence>) -> Vec<Correspondence> {
		let min_distance = matches.iter().map(|m| m.distance).fold(f32::INFINITY, f32::min);
		if !min_distance.is_finite() {
			return Vec::new();
		}
		let cutoff = self.distance_multiplier * min_distance.max(self.min_distance_floor);
		matches.into_iter().filter(|m| m.distance < cutoff).collect()
	}
}

pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b.iter()).map(|(p, q)| (p - q) * (p - q)).sum::<f32>().sqrt()
}
