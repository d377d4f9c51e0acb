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

use pointcloud::data_sources::*;
use pointcloud::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_ram_random_test<M: Metric>(count: usize, data_dim: usize) -> DataRam<M> {
    let mut rng = SmallRng::seed_from_u64(0);
    DataRam::<M>::new(
        (0..count * data_dim).map(|_i| rng.gen::<f32>()).collect(),
        data_dim,
    )
    .unwrap()
}

fn metric_benchmarks<M: Metric>(c: &mut Criterion, name: &str) {
    let count = 1000;
    let dim = 303;
    let pc = build_ram_random_test::<M>(count, dim);

    let indexes_small: [PointIndex; 9] = [1, 3, 5, 7, 9, 11, 13, 15, 17];
    let indexes_large: Vec<PointIndex> = (0..count).collect();

    let point = vec![0.0; dim];

    c.bench_function(&format!("{}_distances_to_point_small", name), |b| {
        b.iter(|| {
            pc.distances_to_point(black_box(&point), black_box(&indexes_small))
                .unwrap()
        })
    });
    c.bench_function(&format!("{}_distances_to_point_large", name), |b| {
        b.iter(|| {
            pc.distances_to_point(black_box(&point), black_box(&indexes_large))
                .unwrap()
        })
    });
    c.bench_function(&format!("{}_permute", name), |b| {
        b.iter(|| pc.permuted(black_box(&indexes_large)).unwrap())
    });
}

fn l2_benchmarks(c: &mut Criterion) {
    metric_benchmarks::<L2>(c, "L2");
}

fn l1_benchmarks(c: &mut Criterion) {
    metric_benchmarks::<L1>(c, "L1");
}

criterion_group!(benches, l2_benchmarks, l1_benchmarks);
criterion_main!(benches);
