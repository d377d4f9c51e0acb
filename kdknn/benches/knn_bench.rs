/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kdknn::query_interface::BulkInterface;
use kdknn::*;
use pointcloud::data_sources::DataRam;
use pointcloud::L2;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::sync::Arc;

fn gaussian_points(count: usize, dim: usize, seed: u64) -> DataRam<L2> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let normal = Normal::new(0.0f32, 1.0).unwrap();
    let data: Vec<f32> = (0..count * dim).map(|_| normal.sample(&mut rng)).collect();
    DataRam::new(data, dim).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let points = gaussian_points(200_000, 8, 0);
    let mut builder = KdTreeBuilder::new();
    builder.set_leaf_capacity(16).set_rng_seed(0);

    let mut group = c.benchmark_group("build");
    group.sample_size(10);
    group.bench_function("200k x 8", |b| {
        b.iter(|| builder.build_from_parts(black_box(points.clone()), None).unwrap())
    });
    group.finish();

    let index = Arc::new(builder.build_from_parts(points, None).unwrap());
    let queries = gaussian_points(1000, 8, 1);
    let query = queries.row(0).to_vec();
    c.bench_function("knn 10", |b| b.iter(|| index.knn(black_box(&query), 10).unwrap()));

    let interface = BulkInterface::new(Arc::clone(&index));
    let refs: Vec<&[f32]> = (0..1000).map(|i| queries.row(i)).collect();
    c.bench_function("bulk knn 10 x 1000", |b| {
        b.iter(|| interface.knn(black_box(&refs), 10))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
